//! Database operations for the `chargers` table.

mod read;
mod types;
mod write;

pub use read::{
    count_chargers, fetch_charger_records, list_chargers_page, list_known_sites, CHARGER_PAGE_SIZE,
};
pub use types::ChargerRow;
pub use write::{
    insert_charger_candidates, IMPORT_HIGHWAY_PROXIMITY, IMPORT_NOTES, IMPORT_STATUS,
};
