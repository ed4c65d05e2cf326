//! Raw record → restaurant transformation
//!
//! Validates the management number and coerces the typed fields. Two levels
//! of tolerance apply:
//!
//! - **Record level**: a blank management number drops the record silently.
//! - **Field level**: a date or date-time that does not parse becomes `None`
//!   and the record carries on. Numeric fields follow the configured
//!   [`NumericPolicy`].

use crate::io::csv_format::RawRecord;
use crate::types::{FieldError, Restaurant, Transformed};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_SHAPE: &[u8] = b"dddd-dd-dd";
const DATE_TIME_SHAPE: &[u8] = b"dddd-dd-dd dd:dd:dd";
const MAX_FRACTION_DIGITS: usize = 9;

/// How numeric parse failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// A numeric field that fails to parse becomes `None`, like dates do
    #[default]
    Lenient,
    /// A numeric field that fails to parse drops the whole record
    Strict,
}

/// Stateless transformer from [`RawRecord`] to [`Restaurant`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTransformer {
    numeric_policy: NumericPolicy,
}

/// Column types parsed by [`RecordTransformer`]
trait NumericField: FromStr {
    /// Whether a parsed value may be stored
    fn is_storable(&self) -> bool {
        true
    }
}

impl NumericField for i64 {}

impl NumericField for Decimal {}

impl NumericField for f64 {
    fn is_storable(&self) -> bool {
        self.is_finite()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn text(value: &str) -> Option<String> {
    non_blank(value).map(str::to_string)
}

/// Check `value` against a fixed-width pattern where `d` stands for an ASCII
/// digit and every other byte must match literally
///
/// chrono alone accepts unpadded fields and a signed year.
fn has_shape(value: &str, shape: &[u8]) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape).all(|(b, &s)| match s {
            b'd' => b.is_ascii_digit(),
            _ => b == s,
        })
}

/// Parse a `yyyy-MM-dd` date
pub fn parse_date(value: &str) -> Result<NaiveDate, FieldError> {
    let invalid = || FieldError::new("date", value, "yyyy-MM-dd");
    if !has_shape(value, DATE_SHAPE) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Parse a `yyyy-MM-dd HH:mm:ss[.fffffffff]` date-time
///
/// The fraction is optional; when present it holds 1 to 9 digits.
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, FieldError> {
    let invalid = || FieldError::new("date-time", value, "yyyy-MM-dd HH:mm:ss[.S]");

    let (base, fraction) = match value.split_once('.') {
        Some((base, fraction)) => (base, Some(fraction)),
        None => (value, None),
    };
    if !has_shape(base, DATE_TIME_SHAPE) {
        return Err(invalid());
    }
    let parsed = NaiveDateTime::parse_from_str(base, DATE_TIME_FORMAT).map_err(|_| invalid())?;

    let Some(fraction) = fraction else {
        return Ok(parsed);
    };
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let nanos: u32 = format!("{:0<9}", fraction).parse().map_err(|_| invalid())?;
    let time = parsed.time().with_nanosecond(nanos).ok_or_else(invalid)?;
    Ok(parsed.date().and_time(time))
}

impl RecordTransformer {
    pub fn new(numeric_policy: NumericPolicy) -> Self {
        Self { numeric_policy }
    }

    fn date(&self, field: &'static str, key: &str, value: &str) -> Option<NaiveDate> {
        let value = non_blank(value)?;
        match parse_date(value) {
            Ok(date) => Some(date),
            Err(_) => {
                warn!(
                    management_number = key,
                    field,
                    value,
                    "Invalid date format, storing null"
                );
                None
            }
        }
    }

    fn date_time(&self, field: &'static str, key: &str, value: &str) -> Option<NaiveDateTime> {
        let value = non_blank(value)?;
        match parse_date_time(value) {
            Ok(date_time) => Some(date_time),
            Err(_) => {
                warn!(
                    management_number = key,
                    field,
                    value,
                    "Invalid date-time format, storing null"
                );
                None
            }
        }
    }

    /// Parse a numeric field according to the policy
    ///
    /// `Ok(None)` for blank values and, under `Lenient`, for unparsable ones.
    fn number<T: NumericField>(
        &self,
        field: &'static str,
        expected: &'static str,
        key: &str,
        value: &str,
    ) -> Result<Option<T>, FieldError> {
        let Some(value) = non_blank(value) else {
            return Ok(None);
        };
        match value.parse::<T>().ok().filter(T::is_storable) {
            Some(number) => Ok(Some(number)),
            None => match self.numeric_policy {
                NumericPolicy::Lenient => {
                    warn!(
                        management_number = key,
                        field,
                        value,
                        "Invalid {}, storing null",
                        expected
                    );
                    Ok(None)
                }
                NumericPolicy::Strict => Err(FieldError::new(field, value, expected)),
            },
        }
    }

    fn build(&self, key: &str, raw: &RawRecord) -> Result<Restaurant, FieldError> {
        Ok(Restaurant {
            management_number: key.to_string(),
            licensing_date: self.date("licensing_date", key, &raw.license_date),
            close_date: self.date("close_date", key, &raw.close_date),
            location_phone_number: text(&raw.location_phone_number),
            location_area: self.number("location_area", "float", key, &raw.location_area)?,
            location_zip_code: text(&raw.location_zip_code),
            full_address: text(&raw.full_address),
            road_name_address: text(&raw.road_name_address),
            road_name_zip_code: text(&raw.road_name_zip_code),
            business_name: text(&raw.business_name),
            last_modified_at: self.date_time("last_modified_at", key, &raw.last_modified_at),
            data_update_type: text(&raw.data_update_type),
            data_updated_at: self.date_time("data_updated_at", key, &raw.data_updated_at),
            industry_type: text(&raw.industry_type),
            coordinate_x: self.number::<Decimal>(
                "coordinate_x",
                "decimal",
                key,
                &raw.coordinate_x,
            )?,
            coordinate_y: self.number::<Decimal>(
                "coordinate_y",
                "decimal",
                key,
                &raw.coordinate_y,
            )?,
            open_auth_code: text(&raw.open_auth_code),
            male_worker_count: self.number(
                "male_worker_count",
                "integer",
                key,
                &raw.male_worker_count,
            )?,
            female_worker_count: self.number(
                "female_worker_count",
                "integer",
                key,
                &raw.female_worker_count,
            )?,
            surrounding_area_type: text(&raw.surrounding_area_type),
            grade_type: text(&raw.grade_type),
            water_facility_type: text(&raw.water_facility_type),
            building_ownership_type: text(&raw.building_ownership_type),
            monthly_rent: self.number("monthly_rent", "integer", key, &raw.monthly_rent)?,
            multi_use_business_yn: text(&raw.multi_use_business_yn),
            total_facility_size: self.number(
                "total_facility_size",
                "float",
                key,
                &raw.total_facility_size,
            )?,
            traditional_business_number: text(&raw.traditional_business_number),
            traditional_business_main_food: text(&raw.traditional_business_main_food),
        })
    }

    /// Transform one raw record
    ///
    /// # Returns
    ///
    /// * `Transformed::Record` - The typed record, with unparsable optional fields set to `None`
    /// * `Transformed::Skip` - The management number is blank, or (under
    ///   `Strict`) a numeric field failed to parse
    pub fn transform(&self, raw: &RawRecord) -> Transformed {
        let Some(key) = non_blank(&raw.management_number) else {
            debug!(
                record_number = %raw.record_number,
                "Skipping record without management number"
            );
            return Transformed::Skip;
        };

        match self.build(key, raw) {
            Ok(restaurant) => Transformed::Record(restaurant),
            Err(error) => {
                warn!(management_number = key, %error, "Skipping record");
                Transformed::Skip
            }
        }
    }
}
