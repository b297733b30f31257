//! Ethiopian-calendar year display helpers.
//!
//! Plans store the Gregorian year; users enter and read the Ethiopian
//! year. The system uses the flat seven-year offset the pages have
//! always used; month- and leap-aware conversion is handled by the
//! backend's own date helper and is not reproduced here.

/// Gregorian year = Ethiopian year + 7.
pub const ETHIOPIAN_YEAR_OFFSET: i32 = 7;

/// Convert an Ethiopian calendar year to the Gregorian year used in
/// API filters and stored plans. `None` only on i32 overflow.
pub fn to_gregorian_year(ethiopian: i32) -> Option<i32> {
    ethiopian.checked_add(ETHIOPIAN_YEAR_OFFSET)
}

/// Convert a stored Gregorian year to the Ethiopian year shown to
/// users. `None` only on i32 overflow.
pub fn to_ethiopian_year(gregorian: i32) -> Option<i32> {
    gregorian.checked_sub(ETHIOPIAN_YEAR_OFFSET)
}
