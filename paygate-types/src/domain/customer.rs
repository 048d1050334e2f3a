//! Customer domain model.

use serde::{Deserialize, Serialize};

/// A counterparty registered with the active payment provider.
///
/// Customers are immutable once created. A provider holds at most one
/// customer per normalized document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCustomer {
    /// Provider-assigned identifier
    pub id: String,
    pub name: String,
    /// CPF (11 digits) or CNPJ (14 digits)
    pub cpf_cnpj: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
}

/// Strips formatting from a CPF/CNPJ, keeping digits only.
///
/// `"123.456.789-01"` and `"12345678901"` normalize to the same value.
pub fn normalize_document(document: &str) -> String {
    document.chars().filter(char::is_ascii_digit).collect()
}

/// Masks a CPF/CNPJ for logs, keeping the first 3 and last 2 digits.
///
/// `"12345678901"` becomes `"123******01"`.
pub fn mask_document(document: &str) -> String {
    let digits = normalize_document(document);
    if digits.len() <= 5 {
        return "*".repeat(digits.len());
    }
    format!(
        "{}{}{}",
        &digits[..3],
        "*".repeat(digits.len() - 5),
        &digits[digits.len() - 2..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_formatted_cpf() {
        assert_eq!(normalize_document("123.456.789-01"), "12345678901");
    }

    #[test]
    fn test_normalize_formatted_cnpj() {
        assert_eq!(normalize_document("12.345.678/0001-95"), "12345678000195");
    }

    #[test]
    fn test_mask_document() {
        assert_eq!(mask_document("12345678901"), "123******01");
        assert_eq!(mask_document("123.456.789-01"), "123******01");
        assert_eq!(mask_document("1234"), "****");
    }

    #[test]
    fn test_customer_serializes_camel_case() {
        let customer = ProviderCustomer {
            id: "cus_1".into(),
            name: "Maria Souza".into(),
            cpf_cnpj: "98765432100".into(),
            email: None,
            phone: None,
            mobile_phone: Some("11999999999".into()),
        };

        let json = serde_json::to_value(&customer).unwrap();

        assert_eq!(json["cpfCnpj"], "98765432100");
        assert_eq!(json["mobilePhone"], "11999999999");
        assert!(json.get("email").is_none());
    }
}
