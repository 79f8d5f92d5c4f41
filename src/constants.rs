//! Constants shared across the DBPF reader, the decoder and the tracker.
//!
//! Type ids, property ids and file conventions are fixed by SimCity 4 and by
//! the sc4pac plugin folder layout. Defining them centrally keeps the magic
//! numbers discoverable.

/// Type id of exemplar records.
pub const TYPE_EXEMPLAR: u32 = 0x6534_284A;

/// Type id of cohort records (exemplars whose properties are inherited).
pub const TYPE_COHORT: u32 = 0x0534_2861;

/// Type, group and instance of the DIR record listing compressed entries.
pub const TYPE_DIR: u32 = 0xE86B_1EEF;
/// Group id of the DIR record.
pub const GROUP_DIR: u32 = 0xE86B_1EEF;
/// Instance id of the DIR record.
pub const INSTANCE_DIR: u32 = 0x286B_1F03;

/// The `ExemplarType` property.
pub const PROPERTY_EXEMPLAR_TYPE: u32 = 0x0000_0010;

/// `ExemplarType` value of lot configuration exemplars.
pub const EXEMPLAR_TYPE_LOT_CONFIGURATIONS: u32 = 0x0000_0010;

/// First property id holding a lot configuration object.
pub const PROPERTY_LOT_OBJECT_FIRST: u32 = 0x88ED_C900;

/// Last property id holding a lot configuration object.
pub const PROPERTY_LOT_OBJECT_LAST: u32 = 0x88ED_CDFF;

/// Index of the first instance id inside a lot object's value array.
pub const LOT_OBJECT_IID_OFFSET: usize = 12;

/// The building/prop family property. Lot objects may reference one of its
/// values instead of a concrete instance id.
pub const PROPERTY_BUILDING_PROP_FAMILY: u32 = 0x2781_2870;

/// Resource Key Type properties pointing at model records.
pub const RKT_PROPERTIES: [u32; 11] = [
    0x2781_2820,
    0x2781_2821,
    0x2781_2822,
    0x2781_2823,
    0x2781_2824,
    0x2781_2825,
    0x2781_2921,
    0x2781_2922,
    0x2781_2923,
    0x2781_2924,
    0x2781_2925,
];

/// Number of values in one repeated RKT block.
pub const RKT_BLOCK_LEN: usize = 8;

/// Offset of the type/group/instance triple inside an RKT block.
pub const RKT_BLOCK_TGI_OFFSET: usize = 5;

/// File extensions (lowercase, without dot) that hold DBPF containers.
pub const CONTAINER_EXTENSIONS: [&str; 4] = ["dat", "sc4lot", "sc4desc", "sc4model"];

/// Suffix of installed sc4pac package folders, e.g.
/// `memo.essential-fixes.1.0.0.sc4pac`.
pub const PACKAGE_FOLDER_SUFFIX: &str = ".sc4pac";

/// Environment variable that disables spinners and progress bars.
pub const NO_PROGRESS_ENV: &str = "SC4PAC_NO_PROGRESS";

/// Display width at which file paths are truncated in the missing table.
pub const MAX_DISPLAY_PATH_LEN: usize = 100;

/// Minimum number of concurrent file reads regardless of CPU count.
///
/// The tracker is I/O bound; 10 keeps throughput reasonable on small machines.
pub const MIN_PARALLELISM: usize = 10;

/// Multiplier applied to the CPU core count for the default concurrency.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Default CPU core count when detection fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Version of the serialized index cache. Bump when the layout changes.
pub const INDEX_CACHE_FORMAT_VERSION: u32 = 1;

/// Default concurrency: `max(MIN_PARALLELISM, cores * PARALLELISM_CORE_MULTIPLIER)`.
pub fn default_max_concurrency() -> usize {
    let cores = std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(FALLBACK_CORE_COUNT);
    std::cmp::max(MIN_PARALLELISM, cores * PARALLELISM_CORE_MULTIPLIER)
}
