//! CSV format handling for the restaurant source file
//!
//! This module centralizes all source-format concerns, providing:
//! - The fixed 47-column layout and its labels
//! - `RawRecord`, the flat string record produced for every data line
//! - EUC-KR decoding of raw line bytes
//! - Parsing of one physical line into a `RawRecord`
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::LoadError;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::EUC_KR;
use serde::Deserialize;
use std::borrow::Cow;

/// Field delimiter of the source file
pub const DELIMITER: u8 = b',';

/// Quote character of the source file
pub const QUOTE: u8 = b'"';

/// Number of data columns in every line
pub const COLUMN_COUNT: usize = 47;

/// Column labels of the source file, in order
///
/// Some exports append an empty 48th "dummy" column; it is read and dropped.
pub const COLUMN_LABELS: [&str; COLUMN_COUNT] = [
    "번호",
    "개방서비스명",
    "개방서비스아이디",
    "개방자치단체코드",
    "관리번호",
    "인허가일자",
    "인허가취소일자",
    "영업상태구분코드",
    "영업상태명",
    "상세영업상태코드",
    "상세영업상태명",
    "폐업일자",
    "휴업시작일자",
    "휴업종료일자",
    "재개업일자",
    "소재지전화",
    "소재지면적",
    "소재지우편번호",
    "소재지전체주소",
    "도로명전체주소",
    "도로명우편번호",
    "사업장명",
    "최종수정시점",
    "데이터갱신구분",
    "데이터갱신일자",
    "업태구분명",
    "좌표정보(X)",
    "좌표정보(Y)",
    "위생업태명",
    "남성종사자수",
    "여성종사자수",
    "영업장주변구분명",
    "등급구분명",
    "급수시설구분명",
    "총종업원수",
    "본사종업원수",
    "공장사무직종업원수",
    "공장판매직종업원수",
    "공장생산직종업원수",
    "건물소유구분명",
    "보증액",
    "월세액",
    "다중이용업소여부",
    "시설총규모",
    "전통업소지정번호",
    "전통업소주된음식",
    "홈페이지",
];

/// One decoded data line, fields in source column order
///
/// No field is required at this stage; empty strings are legal values.
/// Deserialized positionally, so field order must match [`COLUMN_LABELS`].
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub record_number: String,
    pub open_service_name: String,
    pub open_service_id: String,
    pub open_auth_code: String,
    pub management_number: String,
    pub license_date: String,
    pub license_cancel_date: String,
    pub business_status_code: String,
    pub business_status_name: String,
    pub detailed_business_status_code: String,
    pub detailed_business_status_name: String,
    pub close_date: String,
    pub suspension_start_date: String,
    pub suspension_end_date: String,
    pub reopen_date: String,
    pub location_phone_number: String,
    pub location_area: String,
    pub location_zip_code: String,
    pub full_address: String,
    pub road_name_address: String,
    pub road_name_zip_code: String,
    pub business_name: String,
    pub last_modified_at: String,
    pub data_update_type: String,
    pub data_updated_at: String,
    pub industry_type: String,
    pub coordinate_x: String,
    pub coordinate_y: String,
    pub sanitation_industry_type: String,
    pub male_worker_count: String,
    pub female_worker_count: String,
    pub surrounding_area_type: String,
    pub grade_type: String,
    pub water_facility_type: String,
    pub total_worker_count: String,
    pub head_office_worker_count: String,
    pub factory_office_worker_count: String,
    pub factory_sales_worker_count: String,
    pub factory_production_worker_count: String,
    pub building_ownership_type: String,
    pub deposit_amount: String,
    pub monthly_rent: String,
    pub multi_use_business_yn: String,
    pub total_facility_size: String,
    pub traditional_business_number: String,
    pub traditional_business_main_food: String,
    pub homepage: String,
}

/// Decode raw line bytes from EUC-KR
///
/// Strips the line terminator (`\n` or `\r\n`). Invalid byte sequences are
/// replaced with U+FFFD rather than failing the line.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let (text, _had_errors) = EUC_KR.decode_without_bom_handling(bytes);
    text
}

/// Check whether a line ends inside a quoted field
///
/// A quote only opens a quoted field at the start of a field; `""` inside a
/// quoted field is an escaped quote.
pub fn has_unterminated_quote(line: &str) -> bool {
    let quote = QUOTE as char;
    let delimiter = DELIMITER as char;
    let mut chars = line.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == quote {
                if chars.peek() == Some(&quote) {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
        } else if c == delimiter {
            at_field_start = true;
            continue;
        } else if c == quote && at_field_start {
            in_quotes = true;
        }
        at_field_start = false;
    }

    in_quotes
}

/// Split one decoded line into trimmed fields
///
/// Enforces the fixed layout: 47 fields, or 48 with the trailing dummy
/// column, which is dropped.
fn split_line(line: &str, line_number: u64) -> Result<StringRecord, LoadError> {
    if has_unterminated_quote(line) {
        return Err(LoadError::decode(line_number, "unterminated quoted field"));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .trim(Trim::Fields)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    let has_record = reader
        .read_record(&mut record)
        .map_err(|e| LoadError::decode(line_number, e.to_string()))?;
    if !has_record {
        return Err(LoadError::decode(line_number, "line is empty"));
    }

    match record.len() {
        COLUMN_COUNT => Ok(record),
        n if n == COLUMN_COUNT + 1 => {
            record.truncate(COLUMN_COUNT);
            Ok(record)
        }
        n => Err(LoadError::decode(
            line_number,
            format!("expected {} columns, found {}", COLUMN_COUNT, n),
        )),
    }
}

/// Parse one decoded data line into a `RawRecord`
///
/// # Arguments
///
/// * `line` - The decoded line, without terminator
/// * `line_number` - 1-based data line index, used in error messages
///
/// # Returns
///
/// * `Ok(RawRecord)` - All 47 fields in column order
/// * `Err(LoadError::Decode)` - Wrong column count, unterminated quote or empty line
pub fn parse_record(line: &str, line_number: u64) -> Result<RawRecord, LoadError> {
    let record = split_line(line, line_number)?;
    record
        .deserialize::<RawRecord>(None)
        .map_err(|e| LoadError::decode(line_number, e.to_string()))
}

/// Parse the header line and return its labels
///
/// Labels are not compared with [`COLUMN_LABELS`]: exports differ in wording
/// (e.g. `좌표정보x(epsg5174)`), only the column count is fixed.
pub fn parse_header(line: &str) -> Result<Vec<String>, LoadError> {
    let record = split_line(line, 0).map_err(|e| match e {
        LoadError::Decode { message, .. } => {
            LoadError::configuration(format!("invalid header line: {}", message))
        }
        other => other,
    })?;
    Ok(record.iter().map(str::to_string).collect())
}
