//! Event schema registry (spec §4.5 "Per-event processing" step 2,
//! ADDED §C5): every event name the chaincode surface in spec §6 can
//! emit, typed out of the raw JSON payload. Unknown event names are
//! rejected with [`ProjectorError::UnknownEvent`] so the caller can log
//! and skip without stalling the stream.

use ledgerflow_domain::amount::Qirat;
use serde_json::Value;

use crate::error::{ProjectorError, Result};

#[derive(Debug, Clone)]
pub enum KnownEvent {
    UserCreated {
        profile_id: String,
        account_id: String,
        country_code: String,
    },
    WalletCreated {
        wallet_id: String,
        profile_id: String,
    },
    TransferEvent {
        from: String,
        to: String,
        amount: Qirat,
        fee: Qirat,
        from_balance: Qirat,
        to_balance: Qirat,
    },
    TransferWithFeesCompleted {
        from: String,
        to: String,
        amount: Qirat,
        fee: Qirat,
        from_balance: Qirat,
        to_balance: Qirat,
    },
    VelocityTaxApplied {
        account_id: String,
        tax_amount: Qirat,
        balance: Qirat,
    },
    TreasuryAllocationEvent {
        treasury_account_id: String,
        amount: Qirat,
        balance: Qirat,
    },
    SystemPaused {
        reason: String,
    },
    SystemResumed {
        reason: String,
    },
    OrgTxExecuted {
        org_id: String,
        pending_tx_id: String,
    },
    ProposalSubmitted {
        proposal_id: String,
    },
    ProposalExecuted {
        proposal_id: String,
    },
    LoanApproved {
        loan_id: String,
    },
    OrganizationActivated {
        org_id: String,
    },
}

impl KnownEvent {
    pub fn parse(event_name: &str, payload: &Value) -> Result<Self> {
        match event_name {
            "UserCreated" => Ok(KnownEvent::UserCreated {
                profile_id: field_str(payload, "UserCreated", "profileId")?,
                account_id: field_str(payload, "UserCreated", "accountId")?,
                country_code: field_str(payload, "UserCreated", "countryCode")?,
            }),
            "WalletCreated" => Ok(KnownEvent::WalletCreated {
                wallet_id: field_str(payload, "WalletCreated", "walletId")?,
                profile_id: field_str(payload, "WalletCreated", "profileId")?,
            }),
            "TransferEvent" => Ok(KnownEvent::TransferEvent {
                from: field_str(payload, "TransferEvent", "from")?,
                to: field_str(payload, "TransferEvent", "to")?,
                amount: field_amount(payload, "TransferEvent", "amount")?,
                fee: field_amount(payload, "TransferEvent", "fee")?,
                from_balance: field_amount(payload, "TransferEvent", "fromBalance")?,
                to_balance: field_amount(payload, "TransferEvent", "toBalance")?,
            }),
            "TransferWithFeesCompleted" => Ok(KnownEvent::TransferWithFeesCompleted {
                from: field_str(payload, "TransferWithFeesCompleted", "from")?,
                to: field_str(payload, "TransferWithFeesCompleted", "to")?,
                amount: field_amount(payload, "TransferWithFeesCompleted", "amount")?,
                fee: field_amount(payload, "TransferWithFeesCompleted", "fee")?,
                from_balance: field_amount(payload, "TransferWithFeesCompleted", "fromBalance")?,
                to_balance: field_amount(payload, "TransferWithFeesCompleted", "toBalance")?,
            }),
            "VelocityTaxApplied" => Ok(KnownEvent::VelocityTaxApplied {
                account_id: field_str(payload, "VelocityTaxApplied", "accountId")?,
                tax_amount: field_amount(payload, "VelocityTaxApplied", "taxAmount")?,
                balance: field_amount(payload, "VelocityTaxApplied", "balance")?,
            }),
            "TreasuryAllocationEvent" => Ok(KnownEvent::TreasuryAllocationEvent {
                treasury_account_id: field_str(payload, "TreasuryAllocationEvent", "treasuryAccountId")?,
                amount: field_amount(payload, "TreasuryAllocationEvent", "amount")?,
                balance: field_amount(payload, "TreasuryAllocationEvent", "balance")?,
            }),
            "SystemPaused" => Ok(KnownEvent::SystemPaused {
                reason: field_str(payload, "SystemPaused", "reason")?,
            }),
            "SystemResumed" => Ok(KnownEvent::SystemResumed {
                reason: field_str(payload, "SystemResumed", "reason")?,
            }),
            "OrgTxExecuted" => Ok(KnownEvent::OrgTxExecuted {
                org_id: field_str(payload, "OrgTxExecuted", "orgId")?,
                pending_tx_id: field_str(payload, "OrgTxExecuted", "pendingTxId")?,
            }),
            "ProposalSubmitted" => Ok(KnownEvent::ProposalSubmitted {
                proposal_id: field_str(payload, "ProposalSubmitted", "proposalId")?,
            }),
            "ProposalExecuted" => Ok(KnownEvent::ProposalExecuted {
                proposal_id: field_str(payload, "ProposalExecuted", "proposalId")?,
            }),
            "LoanApproved" => Ok(KnownEvent::LoanApproved {
                loan_id: field_str(payload, "LoanApproved", "loanId")?,
            }),
            "OrganizationActivated" => Ok(KnownEvent::OrganizationActivated {
                org_id: field_str(payload, "OrganizationActivated", "orgId")?,
            }),
            other => Err(ProjectorError::UnknownEvent(other.to_string())),
        }
    }
}

fn field_str(payload: &Value, event: &'static str, field: &'static str) -> Result<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProjectorError::MalformedEvent { event, field })
}

fn field_amount(payload: &Value, event: &'static str, field: &'static str) -> Result<Qirat> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or(ProjectorError::MalformedEvent { event, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_created_parses_required_fields() {
        let payload = serde_json::json!({
            "profileId": "profile-1",
            "accountId": "account-1",
            "countryCode": "US",
        });
        let event = KnownEvent::parse("UserCreated", &payload).unwrap();
        assert!(matches!(event, KnownEvent::UserCreated { .. }));
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let err = KnownEvent::parse("SomethingNew", &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ProjectorError::UnknownEvent(name) if name == "SomethingNew"));
    }

    #[test]
    fn missing_field_is_malformed_not_panic() {
        let err = KnownEvent::parse("WalletCreated", &serde_json::json!({ "walletId": "w1" })).unwrap_err();
        assert!(matches!(
            err,
            ProjectorError::MalformedEvent { event: "WalletCreated", field: "profileId" }
        ));
    }

    #[test]
    fn transfer_event_parses_amounts() {
        let payload = serde_json::json!({
            "from": "w1",
            "to": "w2",
            "amount": "500",
            "fee": "5",
            "fromBalance": "9500",
            "toBalance": "10500",
        });
        let event = KnownEvent::parse("TransferEvent", &payload).unwrap();
        match event {
            KnownEvent::TransferEvent { amount, fee, .. } => {
                assert_eq!(amount, Qirat::new(500));
                assert_eq!(fee, Qirat::new(5));
            }
            _ => panic!("expected TransferEvent"),
        }
    }
}
