//! Fold per-statement references into per-procedure lineage

use std::collections::HashSet;

use crate::parser::{ParseWarning, StatementReferences};

use super::{Direction, ProcedureLineage};

/// Union every statement's references into one (reads, writes) pair.
///
/// Statement order has no effect on the sets. Warnings keep their first
/// occurrence order with duplicates removed. With `exclude_self_references`
/// a table that the procedure also writes is dropped from `reads`.
pub fn aggregate<I>(name: &str, statement_refs: I, exclude_self_references: bool) -> ProcedureLineage
where
    I: IntoIterator<Item = StatementReferences>,
{
    let mut lineage = ProcedureLineage {
        name: name.to_string(),
        ..Default::default()
    };
    let mut seen: HashSet<ParseWarning> = HashSet::new();

    for refs in statement_refs {
        for reference in refs.references {
            match reference.direction {
                Direction::Read => lineage.reads.insert(reference.table),
                Direction::Write => lineage.writes.insert(reference.table),
            };
        }
        for warning in refs.warnings {
            if seen.insert(warning.clone()) {
                lineage.warnings.push(warning);
            }
        }
    }

    if exclude_self_references {
        let writes = &lineage.writes;
        lineage.reads.retain(|table| !writes.contains(table));
    }

    lineage
}
