use crate::error::IdCodecError;

/// Account-type hex nibble (spec §3): `0`–`F`, with `B`–`D` reserved for
/// future allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Individual,
    ForProfit,
    NotForProfit,
    Education,
    Healthcare,
    Financial,
    GovernmentTreasury,
    GovernmentOther,
    Igo,
    Diplomatic,
    TrustEstate,
    ReservedB,
    ReservedC,
    ReservedD,
    TemporarySpecial,
    System,
}

impl AccountType {
    pub fn hex_char(&self) -> char {
        match self {
            AccountType::Individual => '0',
            AccountType::ForProfit => '1',
            AccountType::NotForProfit => '2',
            AccountType::Education => '3',
            AccountType::Healthcare => '4',
            AccountType::Financial => '5',
            AccountType::GovernmentTreasury => '6',
            AccountType::GovernmentOther => '7',
            AccountType::Igo => '8',
            AccountType::Diplomatic => '9',
            AccountType::TrustEstate => 'A',
            AccountType::ReservedB => 'B',
            AccountType::ReservedC => 'C',
            AccountType::ReservedD => 'D',
            AccountType::TemporarySpecial => 'E',
            AccountType::System => 'F',
        }
    }

    pub fn from_hex_char(c: char) -> Result<Self, IdCodecError> {
        match c.to_ascii_uppercase() {
            '0' => Ok(AccountType::Individual),
            '1' => Ok(AccountType::ForProfit),
            '2' => Ok(AccountType::NotForProfit),
            '3' => Ok(AccountType::Education),
            '4' => Ok(AccountType::Healthcare),
            '5' => Ok(AccountType::Financial),
            '6' => Ok(AccountType::GovernmentTreasury),
            '7' => Ok(AccountType::GovernmentOther),
            '8' => Ok(AccountType::Igo),
            '9' => Ok(AccountType::Diplomatic),
            'A' => Ok(AccountType::TrustEstate),
            'B' => Ok(AccountType::ReservedB),
            'C' => Ok(AccountType::ReservedC),
            'D' => Ok(AccountType::ReservedD),
            'E' => Ok(AccountType::TemporarySpecial),
            'F' => Ok(AccountType::System),
            other => Err(IdCodecError::InvalidAccountType(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccountType::Individual => "Individual",
            AccountType::ForProfit => "For-profit",
            AccountType::NotForProfit => "Not-for-profit",
            AccountType::Education => "Education",
            AccountType::Healthcare => "Healthcare",
            AccountType::Financial => "Financial",
            AccountType::GovernmentTreasury => "Government Treasury",
            AccountType::GovernmentOther => "Government Other",
            AccountType::Igo => "IGO",
            AccountType::Diplomatic => "Diplomatic",
            AccountType::TrustEstate => "Trust/Estate",
            AccountType::ReservedB => "Reserved",
            AccountType::ReservedC => "Reserved",
            AccountType::ReservedD => "Reserved",
            AccountType::TemporarySpecial => "Temporary/Special",
            AccountType::System => "System",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_for_every_variant() {
        let all = [
            AccountType::Individual,
            AccountType::ForProfit,
            AccountType::NotForProfit,
            AccountType::Education,
            AccountType::Healthcare,
            AccountType::Financial,
            AccountType::GovernmentTreasury,
            AccountType::GovernmentOther,
            AccountType::Igo,
            AccountType::Diplomatic,
            AccountType::TrustEstate,
            AccountType::ReservedB,
            AccountType::ReservedC,
            AccountType::ReservedD,
            AccountType::TemporarySpecial,
            AccountType::System,
        ];
        for t in all {
            let c = t.hex_char();
            assert_eq!(AccountType::from_hex_char(c).unwrap().hex_char(), c);
        }
    }

    #[test]
    fn rejects_non_hex_char() {
        assert!(AccountType::from_hex_char('G').is_err());
    }
}
