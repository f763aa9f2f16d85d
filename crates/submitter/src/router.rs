//! Command-to-contract routing table (spec §4.4/§6 "canonical, MUST be
//! preserved" mapping). Every `CommandType` maps deterministically to a
//! `(contractName, functionName)`; `encode_args` turns the typed payload
//! into the ordered string-arg list the gateway's `submit`/`evaluate`
//! expect. A new command variant is exactly one match arm here.

use ledgerflow_domain::command::{CommandPayload, CommandType};

use crate::error::{Result, SubmitterError};

pub struct Route {
    pub contract: &'static str,
    pub function: &'static str,
}

pub fn route(command_type: CommandType) -> Route {
    use CommandType::*;
    match command_type {
        BootstrapSystem => Route { contract: "AdminContract", function: "BootstrapSystem" },
        InitializeCountryData => Route { contract: "AdminContract", function: "InitializeCountryData" },
        PauseSystem => Route { contract: "AdminContract", function: "PauseSystem" },
        ResumeSystem => Route { contract: "AdminContract", function: "ResumeSystem" },
        UpdateSystemParameter => Route { contract: "AdminContract", function: "UpdateSystemParameter" },
        AppointAdmin => Route { contract: "AdminContract", function: "AppointAdmin" },
        ActivateTreasury => Route { contract: "AdminContract", function: "ActivateTreasuryAccount" },
        DistributeGenesis => Route { contract: "TokenomicsContract", function: "DistributeGenesis" },
        TransferTokens => Route { contract: "TokenomicsContract", function: "TransferWithFees" },
        CreateUser => Route { contract: "IdentityContract", function: "CreateUser" },
        FreezeWallet => Route { contract: "TokenomicsContract", function: "FreezeWallet" },
        UnfreezeWallet => Route { contract: "TokenomicsContract", function: "UnfreezeWallet" },
        ApplyVelocityTax => Route { contract: "TaxAndFeeContract", function: "ApplyVelocityTax" },
        ProposeOrganization => Route { contract: "OrganizationContract", function: "ProposeOrganization" },
        EndorseMembership => Route { contract: "OrganizationContract", function: "EndorseMembership" },
        ActivateOrganization => Route { contract: "OrganizationContract", function: "ActivateOrganization" },
        DefineAuthRule => Route { contract: "OrganizationContract", function: "DefineAuthRule" },
        InitiateOrgMultiSigTx => Route { contract: "OrganizationContract", function: "InitiateMultiSigTx" },
        ApproveOrgMultiSigTx => Route { contract: "OrganizationContract", function: "ApproveMultiSigTx" },
        ApplyForLoan => Route { contract: "LoanPoolContract", function: "ApplyForLoan" },
        ApproveLoan => Route { contract: "LoanPoolContract", function: "ApproveLoan" },
        SubmitGovernanceProposal => Route { contract: "GovernanceContract", function: "SubmitProposal" },
        VoteOnProposal => Route { contract: "GovernanceContract", function: "VoteOnProposal" },
        ExecuteProposal => Route { contract: "GovernanceContract", function: "ExecuteProposal" },
    }
}

/// Encodes a typed payload into the ordered string args the chaincode
/// function expects. `INITIALIZE_COUNTRY_DATA` re-shapes each allocation
/// into the `{countryCode, percentage}` object the contract wants (spec
/// §4.4 — producers use `{code, name, percentage}`, which does not match).
pub fn encode_args(payload: &CommandPayload) -> Result<Vec<String>> {
    use CommandPayload::*;
    Ok(match payload {
        BootstrapSystem { admin_msp_id } => vec![admin_msp_id.clone()],
        InitializeCountryData { countries } => {
            let reshaped: Vec<serde_json::Value> = countries
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "countryCode": c.country_code,
                        "percentage": c.percentage,
                    })
                })
                .collect();
            vec![serde_json::Value::Array(reshaped).to_string()]
        }
        PauseSystem { reason } => vec![reason.clone()],
        ResumeSystem { reason } => vec![reason.clone()],
        UpdateSystemParameter { key, value } => vec![key.clone(), value.clone()],
        AppointAdmin { admin_user_id, msp_id } => vec![admin_user_id.clone(), msp_id.clone()],
        ActivateTreasury { treasury_account_id } => vec![treasury_account_id.clone()],
        DistributeGenesis { user_id, country_code } => vec![user_id.clone(), country_code.clone()],
        TransferTokens {
            from,
            to,
            amount,
            tx_type_hint,
            remark,
            idempotency_key,
        } => vec![
            from.clone(),
            to.clone(),
            amount.to_string(),
            tx_type_hint.clone(),
            remark.clone(),
            idempotency_key.clone(),
        ],
        CreateUser { user_id, biometric_hash, country_code, age } => vec![
            user_id.clone(),
            biometric_hash.clone(),
            country_code.clone(),
            age.to_string(),
        ],
        FreezeWallet { account_id, reason } => vec![account_id.clone(), reason.clone()],
        UnfreezeWallet { account_id } => vec![account_id.clone()],
        ApplyVelocityTax { account_id, tax_rate_bps } => {
            vec![account_id.clone(), tax_rate_bps.to_string()]
        }
        ProposeOrganization { org_id, name, founder_id } => {
            vec![org_id.clone(), name.clone(), founder_id.clone()]
        }
        EndorseMembership { org_id, member_id } => vec![org_id.clone(), member_id.clone()],
        ActivateOrganization { org_id } => vec![org_id.clone()],
        DefineAuthRule { org_id, rule_json } => vec![org_id.clone(), rule_json.to_string()],
        InitiateOrgMultiSigTx { org_id, to, amount } => {
            vec![org_id.clone(), to.clone(), amount.to_string()]
        }
        ApproveOrgMultiSigTx { org_id, pending_tx_id, approver_id } => {
            vec![org_id.clone(), pending_tx_id.clone(), approver_id.clone()]
        }
        ApplyForLoan { borrower_id, amount, term_days } => {
            vec![borrower_id.clone(), amount.to_string(), term_days.to_string()]
        }
        ApproveLoan { loan_id } => vec![loan_id.clone()],
        SubmitGovernanceProposal { proposer_id, proposal_json } => {
            vec![proposer_id.clone(), proposal_json.to_string()]
        }
        VoteOnProposal { proposal_id, voter_id, approve } => {
            vec![proposal_id.clone(), voter_id.clone(), approve.to_string()]
        }
        ExecuteProposal { proposal_id } => vec![proposal_id.clone()],
    })
}

/// Decodes and routes an outbox row's `(command_type, payload)` in one
/// step, surfacing a decode failure as [`SubmitterError::UnsupportedCommand`]
/// rather than panicking the poll loop.
pub fn route_outbox_row(
    command_type: CommandType,
    payload: &serde_json::Value,
) -> Result<(Route, Vec<String>)> {
    let typed = CommandPayload::from_json(command_type, payload)
        .map_err(|e| SubmitterError::UnsupportedCommand(e.to_string()))?;
    Ok((route(command_type), encode_args(&typed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerflow_domain::amount::Qirat;

    #[test]
    fn transfer_tokens_routes_to_tokenomics_transfer_with_fees() {
        let r = route(CommandType::TransferTokens);
        assert_eq!(r.contract, "TokenomicsContract");
        assert_eq!(r.function, "TransferWithFees");
    }

    #[test]
    fn create_user_routes_to_identity_contract() {
        let r = route(CommandType::CreateUser);
        assert_eq!(r.contract, "IdentityContract");
        assert_eq!(r.function, "CreateUser");
    }

    #[test]
    fn transfer_tokens_args_preserve_order() {
        let payload = CommandPayload::TransferTokens {
            from: "a".to_string(),
            to: "b".to_string(),
            amount: Qirat::new(500),
            tx_type_hint: "TRANSFER".to_string(),
            remark: "r".to_string(),
            idempotency_key: "k".to_string(),
        };
        let args = encode_args(&payload).unwrap();
        assert_eq!(args, vec!["a", "b", "500", "TRANSFER", "r", "k"]);
    }

    #[test]
    fn initialize_country_data_reshapes_to_country_code_percentage() {
        use ledgerflow_domain::command::CountryAllocation;
        let payload = CommandPayload::InitializeCountryData {
            countries: vec![CountryAllocation {
                country_code: "US".to_string(),
                percentage: 40.0,
            }],
        };
        let args = encode_args(&payload).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&args[0]).unwrap();
        assert_eq!(decoded[0]["countryCode"], "US");
        assert_eq!(decoded[0]["percentage"], 40.0);
        assert!(decoded[0].get("name").is_none());
    }

    #[test]
    fn every_command_type_has_a_route() {
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
            let r = route(ct);
            assert!(!r.contract.is_empty());
            assert!(!r.function.is_empty());
        }
    }
}
