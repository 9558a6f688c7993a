//! Schema dump directory loading

mod dump_loader;

pub use dump_loader::{
    load_dump, read_dump_meta, DumpContents, DumpMeta, DumpMetaRoutine, DumpMetaTable,
    DumpPatterns, DUMP_META_FILE, PROCEDURE_FILE_PATTERN, TABLE_FILE_PATTERN,
};
