//! Restaurant domain record
//!
//! The typed row that ends up in the `restaurant` table. Only 28 of the 47
//! source columns survive the transformation; the rest are read and dropped.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Unique business key of a restaurant licence
pub type ManagementNumber = String;

/// A validated, typed restaurant record
///
/// Invariant: `management_number` is never blank. Every other field is
/// optional and is `None` when the source value was empty or failed to parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Restaurant {
    /// Unique business key (관리번호)
    pub management_number: ManagementNumber,

    /// 인허가일자
    pub licensing_date: Option<NaiveDate>,
    /// 폐업일자
    pub close_date: Option<NaiveDate>,

    pub location_phone_number: Option<String>,
    /// Floor area in square metres (소재지면적)
    pub location_area: Option<f64>,
    pub location_zip_code: Option<String>,
    pub full_address: Option<String>,
    pub road_name_address: Option<String>,
    pub road_name_zip_code: Option<String>,
    pub business_name: Option<String>,

    /// 최종수정시점
    pub last_modified_at: Option<NaiveDateTime>,
    pub data_update_type: Option<String>,
    /// 데이터갱신일자
    pub data_updated_at: Option<NaiveDateTime>,
    pub industry_type: Option<String>,

    /// Projected X coordinate, kept at full source precision
    pub coordinate_x: Option<Decimal>,
    /// Projected Y coordinate, kept at full source precision
    pub coordinate_y: Option<Decimal>,

    pub open_auth_code: Option<String>,
    pub male_worker_count: Option<i64>,
    pub female_worker_count: Option<i64>,
    pub surrounding_area_type: Option<String>,
    pub grade_type: Option<String>,
    pub water_facility_type: Option<String>,
    pub building_ownership_type: Option<String>,
    pub monthly_rent: Option<i64>,
    pub multi_use_business_yn: Option<String>,
    pub total_facility_size: Option<f64>,
    pub traditional_business_number: Option<String>,
    pub traditional_business_main_food: Option<String>,
}

impl Restaurant {
    /// Create a record carrying only its key
    pub fn new(management_number: impl Into<ManagementNumber>) -> Self {
        Self {
            management_number: management_number.into(),
            ..Self::default()
        }
    }
}

/// Result of transforming one raw record
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    /// The record is valid and should be loaded
    Record(Restaurant),
    /// The record is dropped before reaching the loader
    ///
    /// Filtered records never count against the skip budget.
    Skip,
}

impl Transformed {
    /// Get the contained record, if any
    pub fn into_record(self) -> Option<Restaurant> {
        match self {
            Transformed::Record(restaurant) => Some(restaurant),
            Transformed::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Transformed::Skip)
    }
}
