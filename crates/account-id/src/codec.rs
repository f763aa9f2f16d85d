//! Generation, decoding and validation of the 20-character account
//! identifier (spec §3, §4.2, §8).
//!
//! Canonical form is the bare 20-character string (no separators); block
//! boundaries are `country(2) checksum(3) dobGender(6) type(1)+letters(4)
//! digits(4)`. [`format_display`] renders the human-readable, space
//! delimited variant used in the worked example in spec §3; it is not the
//! form [`decode`]/[`validate`] expect.

use crate::account_type::AccountType;
use crate::error::IdCodecError;
use chrono::NaiveDate;
use rand::Rng;
use sha1::{Digest, Sha1};

const EPOCH: (i32, u32, u32) = (1900, 1, 1);
const MIN_DOB: (i32, u32, u32) = (1900, 1, 1);
const MAX_DOB: (i32, u32, u32) = (3999, 12, 31);

const FEMALE_OFFSET: i64 = 500_000;
const ORG_OFFSET: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone)]
pub struct DecodedId {
    pub country: String,
    pub checksum: String,
    pub dob: NaiveDate,
    pub sex: Option<Sex>,
    pub is_organization: bool,
    pub account_type: AccountType,
    pub account_type_name: &'static str,
    pub unique_suffix: String,
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2).expect("epoch is a valid date")
}

fn validate_country(country: &str) -> Result<String, IdCodecError> {
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(IdCodecError::InvalidCountry(country.to_string()));
    }
    Ok(country.to_ascii_uppercase())
}

fn validate_dob(dob: NaiveDate) -> Result<(), IdCodecError> {
    let min = NaiveDate::from_ymd_opt(MIN_DOB.0, MIN_DOB.1, MIN_DOB.2).unwrap();
    let max = NaiveDate::from_ymd_opt(MAX_DOB.0, MAX_DOB.1, MAX_DOB.2).unwrap();
    if dob < min || dob > max {
        return Err(IdCodecError::InvalidDob(dob.to_string()));
    }
    Ok(())
}

fn encode_base26(mut value: i64) -> String {
    let mut chars = ['A'; 3];
    for slot in chars.iter_mut().rev() {
        let digit = (value % 26) as u8;
        *slot = (b'A' + digit) as char;
        value /= 26;
    }
    chars.iter().collect()
}

fn decode_base26(s: &str) -> Result<i64, IdCodecError> {
    if s.len() != 3 || !s.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(IdCodecError::InvalidDobEncoding);
    }
    let mut value: i64 = 0;
    for c in s.chars() {
        value = value * 26 + (c as i64 - 'A' as i64);
    }
    Ok(value)
}

/// Encodes `(dob, sex-or-organization)` into the 6-char `BBB###` block.
fn encode_dob_block(dob: NaiveDate, sex: Option<Sex>, is_organization: bool) -> String {
    let day_index = (dob - epoch_date()).num_days();
    let offset = if is_organization {
        ORG_OFFSET
    } else {
        match sex {
            Some(Sex::Female) => FEMALE_OFFSET,
            _ => 0,
        }
    };
    let combined = day_index + offset;
    let letters_value = combined / 1000;
    let digits_value = combined % 1000;
    format!("{}{:03}", encode_base26(letters_value), digits_value)
}

fn decode_dob_block(block: &str) -> Result<(NaiveDate, Option<Sex>, bool), IdCodecError> {
    if block.len() != 6 {
        return Err(IdCodecError::InvalidDobEncoding);
    }
    let (letters, digits) = block.split_at(3);
    let letters_value = decode_base26(letters)?;
    let digits_value: i64 = digits
        .parse()
        .map_err(|_| IdCodecError::InvalidDobEncoding)?;
    let combined = letters_value * 1000 + digits_value;

    let (day_index, sex, is_organization) = if combined >= ORG_OFFSET {
        (combined - ORG_OFFSET, None, true)
    } else if combined >= FEMALE_OFFSET {
        (combined - FEMALE_OFFSET, Some(Sex::Female), false)
    } else {
        (combined, Some(Sex::Male), false)
    };

    let dob = epoch_date()
        .checked_add_signed(chrono::Duration::days(day_index))
        .ok_or(IdCodecError::InvalidDobEncoding)?;
    validate_dob(dob).map_err(|_| IdCodecError::InvalidDobEncoding)?;
    Ok((dob, sex, is_organization))
}

fn checksum_for(dob_block: &str) -> String {
    let digest = Sha1::digest(dob_block.as_bytes());
    let hex = hex_encode(&digest);
    hex[..3].to_ascii_uppercase()
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{:02x}", b).expect("writing to a String never fails");
    }
    out
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    let letters: String = (0..4)
        .map(|_| (b'A' + rng.gen_range(0..26)) as char)
        .collect();
    let digits: String = (0..4).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect();
    format!("{}{}", letters, digits)
}

/// Generates a new 20-character account id.
pub fn generate(
    country: &str,
    dob: NaiveDate,
    sex: Option<Sex>,
    is_organization: bool,
    account_type: AccountType,
) -> Result<String, IdCodecError> {
    let country = validate_country(country)?;
    validate_dob(dob)?;
    if !is_organization && sex.is_none() {
        return Err(IdCodecError::InvalidGender);
    }

    let dob_block = encode_dob_block(dob, sex, is_organization);
    let checksum = checksum_for(&dob_block);
    let suffix = random_suffix();

    Ok(format!(
        "{country}{checksum}{dob_block}{type_hex}{suffix}",
        type_hex = account_type.hex_char()
    ))
}

/// Decodes and fully validates a 20-character account id.
pub fn decode(id: &str) -> Result<DecodedId, IdCodecError> {
    if id.len() != 20 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(IdCodecError::InvalidFormat(id.to_string()));
    }

    let country = validate_country(&id[0..2])?;
    let checksum = id[2..5].to_string();
    let dob_block = &id[5..11];
    let type_hex = id.as_bytes()[11] as char;
    let unique_suffix = id[12..20].to_string();

    if checksum_for(dob_block) != checksum {
        return Err(IdCodecError::InvalidChecksum);
    }

    let (dob, sex, is_organization) = decode_dob_block(dob_block)?;
    let account_type = AccountType::from_hex_char(type_hex)?;

    Ok(DecodedId {
        country,
        checksum,
        dob,
        sex,
        is_organization,
        account_type_name: account_type.name(),
        account_type,
        unique_suffix,
    })
}

/// Renders the space-delimited display form `CC AAA BBB### T#### ####`.
pub fn format_display(id: &str) -> Result<String, IdCodecError> {
    if id.len() != 20 {
        return Err(IdCodecError::InvalidFormat(id.to_string()));
    }
    Ok(format!(
        "{} {} {} {} {}",
        &id[0..2],
        &id[2..5],
        &id[5..11],
        &id[11..16],
        &id[16..20]
    ))
}

pub fn validate(id: &str) -> bool {
    decode(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dob(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn generate_then_decode_round_trips() {
        let id = generate(
            "us",
            dob(1990, 6, 15),
            Some(Sex::Male),
            false,
            AccountType::Individual,
        )
        .unwrap();
        assert_eq!(id.len(), 20);

        let decoded = decode(&id).unwrap();
        assert_eq!(decoded.country, "US");
        assert_eq!(decoded.dob, dob(1990, 6, 15));
        assert_eq!(decoded.sex, Some(Sex::Male));
        assert!(!decoded.is_organization);
        assert_eq!(decoded.account_type.hex_char(), '0');
    }

    #[test]
    fn organization_flag_round_trips() {
        let id = generate(
            "gb",
            dob(2010, 1, 1),
            None,
            true,
            AccountType::NotForProfit,
        )
        .unwrap();
        let decoded = decode(&id).unwrap();
        assert!(decoded.is_organization);
        assert_eq!(decoded.sex, None);
    }

    #[test]
    fn female_offset_round_trips() {
        let id = generate(
            "ke",
            dob(2001, 3, 4),
            Some(Sex::Female),
            false,
            AccountType::Education,
        )
        .unwrap();
        let decoded = decode(&id).unwrap();
        assert_eq!(decoded.sex, Some(Sex::Female));
        assert!(!decoded.is_organization);
    }

    #[test]
    fn boundary_dates_are_accepted() {
        assert!(generate("us", dob(1900, 1, 1), Some(Sex::Male), false, AccountType::System).is_ok());
        assert!(generate("us", dob(3999, 12, 31), Some(Sex::Male), false, AccountType::System).is_ok());
    }

    #[test]
    fn out_of_range_dates_are_rejected() {
        assert!(matches!(
            generate("us", dob(1899, 12, 31), Some(Sex::Male), false, AccountType::System),
            Err(IdCodecError::InvalidDob(_))
        ));
    }

    #[test]
    fn tampered_checksum_is_rejected() {
        let id = generate("us", dob(1990, 6, 15), Some(Sex::Male), false, AccountType::Individual).unwrap();
        let mut chars: Vec<char> = id.chars().collect();
        chars[2] = if chars[2] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert_eq!(decode(&tampered), Err(IdCodecError::InvalidChecksum));
    }

    #[test]
    fn wrong_length_is_invalid_format() {
        assert!(matches!(decode("TOOSHORT"), Err(IdCodecError::InvalidFormat(_))));
    }

    #[test]
    fn validate_matches_decode_success() {
        let id = generate("us", dob(1990, 6, 15), Some(Sex::Male), false, AccountType::Individual).unwrap();
        assert!(validate(&id));
        assert!(!validate("not-a-valid-id"));
    }

    #[test]
    fn display_form_inserts_separators() {
        let id = generate("us", dob(1990, 6, 15), Some(Sex::Male), false, AccountType::Individual).unwrap();
        let display = format_display(&id).unwrap();
        assert_eq!(display.len(), 24);
        assert_eq!(display.matches(' ').count(), 4);
    }
}
