//! Typed outbox command payloads.
//!
//! Source pattern being replaced (spec §9): a dynamic `any` payload keyed only
//! by a string `commandType`. Here the payload is still stored as an opaque
//! JSON value on the outbox row (so the schema doesn't need a migration per
//! command), but every command the submitter actually understands has a typed
//! Rust variant with its own `encode`/`decode`, so a typo in a field name is a
//! compile error in the router, not a runtime KeyError deep in a submit call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every privileged action the outbox pipeline knows how to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    BootstrapSystem,
    InitializeCountryData,
    PauseSystem,
    ResumeSystem,
    UpdateSystemParameter,
    AppointAdmin,
    ActivateTreasury,
    DistributeGenesis,
    TransferTokens,
    CreateUser,
    FreezeWallet,
    UnfreezeWallet,
    ApplyVelocityTax,
    ProposeOrganization,
    EndorseMembership,
    ActivateOrganization,
    DefineAuthRule,
    InitiateOrgMultiSigTx,
    ApproveOrgMultiSigTx,
    ApplyForLoan,
    ApproveLoan,
    SubmitGovernanceProposal,
    VoteOnProposal,
    ExecuteProposal,
}

impl CommandType {
    /// The `commandType` string as it appears on the wire / in the database,
    /// matching spec §4.4's `SCREAMING_SNAKE_CASE` naming.
    pub fn as_wire_str(&self) -> &'static str {
        use CommandType::*;
        match self {
            BootstrapSystem => "BOOTSTRAP_SYSTEM",
            InitializeCountryData => "INITIALIZE_COUNTRY_DATA",
            PauseSystem => "PAUSE_SYSTEM",
            ResumeSystem => "RESUME_SYSTEM",
            UpdateSystemParameter => "UPDATE_SYSTEM_PARAMETER",
            AppointAdmin => "APPOINT_ADMIN",
            ActivateTreasury => "ACTIVATE_TREASURY",
            DistributeGenesis => "DISTRIBUTE_GENESIS",
            TransferTokens => "TRANSFER_TOKENS",
            CreateUser => "CREATE_USER",
            FreezeWallet => "FREEZE_WALLET",
            UnfreezeWallet => "UNFREEZE_WALLET",
            ApplyVelocityTax => "APPLY_VELOCITY_TAX",
            ProposeOrganization => "PROPOSE_ORGANIZATION",
            EndorseMembership => "ENDORSE_MEMBERSHIP",
            ActivateOrganization => "ACTIVATE_ORGANIZATION",
            DefineAuthRule => "DEFINE_AUTH_RULE",
            InitiateOrgMultiSigTx => "INITIATE_ORG_MULTISIG_TX",
            ApproveOrgMultiSigTx => "APPROVE_ORG_MULTISIG_TX",
            ApplyForLoan => "APPLY_FOR_LOAN",
            ApproveLoan => "APPROVE_LOAN",
            SubmitGovernanceProposal => "SUBMIT_GOVERNANCE_PROPOSAL",
            VoteOnProposal => "VOTE_ON_PROPOSAL",
            ExecuteProposal => "EXECUTE_PROPOSAL",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        use CommandType::*;
        Some(match s {
            "BOOTSTRAP_SYSTEM" => BootstrapSystem,
            "INITIALIZE_COUNTRY_DATA" => InitializeCountryData,
            "PAUSE_SYSTEM" => PauseSystem,
            "RESUME_SYSTEM" => ResumeSystem,
            "UPDATE_SYSTEM_PARAMETER" => UpdateSystemParameter,
            "APPOINT_ADMIN" => AppointAdmin,
            "ACTIVATE_TREASURY" => ActivateTreasury,
            "DISTRIBUTE_GENESIS" => DistributeGenesis,
            "TRANSFER_TOKENS" => TransferTokens,
            "CREATE_USER" => CreateUser,
            "FREEZE_WALLET" => FreezeWallet,
            "UNFREEZE_WALLET" => UnfreezeWallet,
            "APPLY_VELOCITY_TAX" => ApplyVelocityTax,
            "PROPOSE_ORGANIZATION" => ProposeOrganization,
            "ENDORSE_MEMBERSHIP" => EndorseMembership,
            "ACTIVATE_ORGANIZATION" => ActivateOrganization,
            "DEFINE_AUTH_RULE" => DefineAuthRule,
            "INITIATE_ORG_MULTISIG_TX" => InitiateOrgMultiSigTx,
            "APPROVE_ORG_MULTISIG_TX" => ApproveOrgMultiSigTx,
            "APPLY_FOR_LOAN" => ApplyForLoan,
            "APPROVE_LOAN" => ApproveLoan,
            "SUBMIT_GOVERNANCE_PROPOSAL" => SubmitGovernanceProposal,
            "VOTE_ON_PROPOSAL" => VoteOnProposal,
            "EXECUTE_PROPOSAL" => ExecuteProposal,
            _ => return None,
        })
    }

    /// Identity role required to submit this command (spec §4.4 "Identity selection").
    pub fn identity_role(&self) -> IdentityRole {
        use CommandType::*;
        match self {
            BootstrapSystem | InitializeCountryData | PauseSystem | ResumeSystem => {
                IdentityRole::SuperAdmin
            }
            AppointAdmin | ActivateTreasury | DistributeGenesis | TransferTokens => {
                IdentityRole::Admin
            }
            _ => IdentityRole::PartnerApi,
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

/// The gateway identity role a command must be submitted under (spec §4.4/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    SuperAdmin,
    Admin,
    PartnerApi,
}

impl IdentityRole {
    /// Wallet directory name, per spec §6 (`org1-super-admin`, `org1-admin`,
    /// `org1-partner-api`).
    pub fn wallet_name(&self) -> &'static str {
        match self {
            IdentityRole::SuperAdmin => "org1-super-admin",
            IdentityRole::Admin => "org1-admin",
            IdentityRole::PartnerApi => "org1-partner-api",
        }
    }
}

/// Typed command payloads. `command_type()` must always agree with the
/// discriminant used to store/retrieve this value — the router asserts this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "commandType")]
pub enum CommandPayload {
    #[serde(rename = "BOOTSTRAP_SYSTEM")]
    BootstrapSystem { admin_msp_id: String },
    #[serde(rename = "INITIALIZE_COUNTRY_DATA")]
    InitializeCountryData { countries: Vec<CountryAllocation> },
    #[serde(rename = "PAUSE_SYSTEM")]
    PauseSystem { reason: String },
    #[serde(rename = "RESUME_SYSTEM")]
    ResumeSystem { reason: String },
    #[serde(rename = "UPDATE_SYSTEM_PARAMETER")]
    UpdateSystemParameter { key: String, value: String },
    #[serde(rename = "APPOINT_ADMIN")]
    AppointAdmin { admin_user_id: String, msp_id: String },
    #[serde(rename = "ACTIVATE_TREASURY")]
    ActivateTreasury { treasury_account_id: String },
    #[serde(rename = "DISTRIBUTE_GENESIS")]
    DistributeGenesis {
        user_id: String,
        country_code: String,
    },
    #[serde(rename = "TRANSFER_TOKENS")]
    TransferTokens {
        from: String,
        to: String,
        amount: crate::amount::Qirat,
        tx_type_hint: String,
        remark: String,
        idempotency_key: String,
    },
    #[serde(rename = "CREATE_USER")]
    CreateUser {
        user_id: String,
        biometric_hash: String,
        country_code: String,
        age: u32,
    },
    #[serde(rename = "FREEZE_WALLET")]
    FreezeWallet { account_id: String, reason: String },
    #[serde(rename = "UNFREEZE_WALLET")]
    UnfreezeWallet { account_id: String },
    #[serde(rename = "APPLY_VELOCITY_TAX")]
    ApplyVelocityTax {
        account_id: String,
        tax_rate_bps: u32,
    },
    #[serde(rename = "PROPOSE_ORGANIZATION")]
    ProposeOrganization {
        org_id: String,
        name: String,
        founder_id: String,
    },
    #[serde(rename = "ENDORSE_MEMBERSHIP")]
    EndorseMembership { org_id: String, member_id: String },
    #[serde(rename = "ACTIVATE_ORGANIZATION")]
    ActivateOrganization { org_id: String },
    #[serde(rename = "DEFINE_AUTH_RULE")]
    DefineAuthRule {
        org_id: String,
        rule_json: serde_json::Value,
    },
    #[serde(rename = "INITIATE_ORG_MULTISIG_TX")]
    InitiateOrgMultiSigTx {
        org_id: String,
        to: String,
        amount: crate::amount::Qirat,
    },
    #[serde(rename = "APPROVE_ORG_MULTISIG_TX")]
    ApproveOrgMultiSigTx {
        org_id: String,
        pending_tx_id: String,
        approver_id: String,
    },
    #[serde(rename = "APPLY_FOR_LOAN")]
    ApplyForLoan {
        borrower_id: String,
        amount: crate::amount::Qirat,
        term_days: u32,
    },
    #[serde(rename = "APPROVE_LOAN")]
    ApproveLoan { loan_id: String },
    #[serde(rename = "SUBMIT_GOVERNANCE_PROPOSAL")]
    SubmitGovernanceProposal {
        proposer_id: String,
        proposal_json: serde_json::Value,
    },
    #[serde(rename = "VOTE_ON_PROPOSAL")]
    VoteOnProposal {
        proposal_id: String,
        voter_id: String,
        approve: bool,
    },
    #[serde(rename = "EXECUTE_PROPOSAL")]
    ExecuteProposal { proposal_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryAllocation {
    pub country_code: String,
    pub percentage: f64,
}

impl CommandPayload {
    pub fn command_type(&self) -> CommandType {
        use CommandPayload::*;
        match self {
            BootstrapSystem { .. } => CommandType::BootstrapSystem,
            InitializeCountryData { .. } => CommandType::InitializeCountryData,
            PauseSystem { .. } => CommandType::PauseSystem,
            ResumeSystem { .. } => CommandType::ResumeSystem,
            UpdateSystemParameter { .. } => CommandType::UpdateSystemParameter,
            AppointAdmin { .. } => CommandType::AppointAdmin,
            ActivateTreasury { .. } => CommandType::ActivateTreasury,
            DistributeGenesis { .. } => CommandType::DistributeGenesis,
            TransferTokens { .. } => CommandType::TransferTokens,
            CreateUser { .. } => CommandType::CreateUser,
            FreezeWallet { .. } => CommandType::FreezeWallet,
            UnfreezeWallet { .. } => CommandType::UnfreezeWallet,
            ApplyVelocityTax { .. } => CommandType::ApplyVelocityTax,
            ProposeOrganization { .. } => CommandType::ProposeOrganization,
            EndorseMembership { .. } => CommandType::EndorseMembership,
            ActivateOrganization { .. } => CommandType::ActivateOrganization,
            DefineAuthRule { .. } => CommandType::DefineAuthRule,
            InitiateOrgMultiSigTx { .. } => CommandType::InitiateOrgMultiSigTx,
            ApproveOrgMultiSigTx { .. } => CommandType::ApproveOrgMultiSigTx,
            ApplyForLoan { .. } => CommandType::ApplyForLoan,
            ApproveLoan { .. } => CommandType::ApproveLoan,
            SubmitGovernanceProposal { .. } => CommandType::SubmitGovernanceProposal,
            VoteOnProposal { .. } => CommandType::VoteOnProposal,
            ExecuteProposal { .. } => CommandType::ExecuteProposal,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("CommandPayload always serializes")
    }

    pub fn from_json(command_type: CommandType, value: &serde_json::Value) -> Result<Self, CommandDecodeError> {
        let parsed: CommandPayload = serde_json::from_value(value.clone())
            .map_err(|e| CommandDecodeError::Malformed(command_type, e.to_string()))?;
        if parsed.command_type() != command_type {
            return Err(CommandDecodeError::TypeMismatch {
                declared: command_type,
                actual: parsed.command_type(),
            });
        }
        Ok(parsed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandDecodeError {
    #[error("payload for {0} is malformed: {1}")]
    Malformed(CommandType, String),
    #[error("outbox row declared command_type={declared} but payload decodes as {actual}")]
    TypeMismatch {
        declared: CommandType,
        actual: CommandType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_str_round_trips_for_every_variant() {
        let all = [
            CommandType::BootstrapSystem,
            CommandType::InitializeCountryData,
            CommandType::PauseSystem,
            CommandType::ResumeSystem,
            CommandType::UpdateSystemParameter,
            CommandType::AppointAdmin,
            CommandType::ActivateTreasury,
            CommandType::DistributeGenesis,
            CommandType::TransferTokens,
            CommandType::CreateUser,
            CommandType::FreezeWallet,
            CommandType::UnfreezeWallet,
            CommandType::ApplyVelocityTax,
            CommandType::ProposeOrganization,
            CommandType::EndorseMembership,
            CommandType::ActivateOrganization,
            CommandType::DefineAuthRule,
            CommandType::InitiateOrgMultiSigTx,
            CommandType::ApproveOrgMultiSigTx,
            CommandType::ApplyForLoan,
            CommandType::ApproveLoan,
            CommandType::SubmitGovernanceProposal,
            CommandType::VoteOnProposal,
            CommandType::ExecuteProposal,
        ];
        for ct in all {
            assert_eq!(CommandType::from_wire_str(ct.as_wire_str()), Some(ct));
        }
    }

    #[test]
    fn identity_routing_matches_spec_table() {
        assert_eq!(
            CommandType::BootstrapSystem.identity_role(),
            IdentityRole::SuperAdmin
        );
        assert_eq!(
            CommandType::InitializeCountryData.identity_role(),
            IdentityRole::SuperAdmin
        );
        assert_eq!(
            CommandType::TransferTokens.identity_role(),
            IdentityRole::Admin
        );
        assert_eq!(
            CommandType::DistributeGenesis.identity_role(),
            IdentityRole::Admin
        );
        assert_eq!(
            CommandType::CreateUser.identity_role(),
            IdentityRole::PartnerApi
        );
        assert_eq!(
            CommandType::ApplyVelocityTax.identity_role(),
            IdentityRole::PartnerApi
        );
    }

    #[test]
    fn payload_encode_decode_round_trip() {
        let payload = CommandPayload::TransferTokens {
            from: "US A3F HBF934 0ABCD 1234".to_string(),
            to: "GB B2E HCG045 0EFGH 5678".to_string(),
            amount: "1000000".parse().unwrap(),
            tx_type_hint: "TRANSFER".to_string(),
            remark: "payment".to_string(),
            idempotency_key: "req-1".to_string(),
        };
        let json = payload.to_json();
        let decoded = CommandPayload::from_json(CommandType::TransferTokens, &json).unwrap();
        assert_eq!(decoded.command_type(), CommandType::TransferTokens);
    }

    #[test]
    fn payload_decode_rejects_type_mismatch() {
        let payload = CommandPayload::CreateUser {
            user_id: "u1".to_string(),
            biometric_hash: "hash".to_string(),
            country_code: "US".to_string(),
            age: 30,
        };
        let json = payload.to_json();
        let err = CommandPayload::from_json(CommandType::TransferTokens, &json).unwrap_err();
        assert!(matches!(err, CommandDecodeError::TypeMismatch { .. }));
    }
}
