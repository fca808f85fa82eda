//! Disc-set normalization and multi-disc grouping engine.
//!
//! The library turns the loose contents of an extracted disc dump archive
//! into a canonically named disc set (one cue sheet plus its bins, or a
//! single image file), and groups normalized per-disc files of multi-disc
//! titles back together for re-archiving. Compression, extraction and ECM
//! decoding are delegated to external executables through `ArchiveTools`.

mod census;
pub use census::{census, checked_census};

mod classify;
pub use classify::{classify, has_extension, is_archive};

mod cue_repair;
pub use cue_repair::fix_bin_reference;

mod denest;
pub use denest::{denest, denest_self_named};

mod grouping;
pub use grouping::{derive_archive_name, group_by_game, parse_game_key};

mod lib_error_handling;
pub use lib_error_handling::DiscZipError;

mod lib_structs;
pub use lib_structs::{
    AMBIGUITY_EXTENSIONS,
    CueSheet, DiscFileRecord, DiscRole, DiscSetCensus, GameGroup, ToolOutcome
};

mod rename;
pub use rename::{
    RelocationReport,
    normalize_disc_set, relocate_files, rename_disc_set, repair_cue
};

mod tools;
pub use tools::{
    ARCHIVER_TOOL, ECM_TOOL, RAR_TOOL,
    ArchiveTools, ProcessRunner, ToolRunner
};

mod util;
pub use util::{
    collect_files, file_name_of, move_file, replace_file_extension,
    try_force_delete_dir, try_force_delete_file
};

mod workspace;
pub use workspace::ExtractionWorkspace;
