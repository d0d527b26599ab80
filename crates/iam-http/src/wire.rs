//! Request and response bodies for the principal lookup endpoint.

use iam_core::{Principal, PrincipalKind, PrincipalView};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct BatchGetPrincipalsRequest<'a> {
    pub principal_ids: &'a [String],
    pub view: PrincipalView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BatchGetPrincipalsResponse {
    #[serde(default)]
    pub principals: Vec<PrincipalRecord>,
    #[serde(default)]
    pub next_page_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum PrincipalTypeWire {
    User,
    Group,
    Service,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserDetails {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroupDetails {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceDetails {
    #[serde(default)]
    pub name: Option<String>,
}

/// One principal as returned by the backend.
///
/// Detail objects are absent under the basic view.
#[derive(Debug, Deserialize)]
pub(crate) struct PrincipalRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub principal_type: PrincipalTypeWire,
    #[serde(default)]
    pub user: Option<UserDetails>,
    #[serde(default)]
    pub group: Option<GroupDetails>,
    #[serde(default)]
    pub service: Option<ServiceDetails>,
}

impl From<PrincipalRecord> for Principal {
    fn from(record: PrincipalRecord) -> Self {
        let kind = match record.principal_type {
            PrincipalTypeWire::User => PrincipalKind::User {
                full_name: record.user.and_then(|u| u.full_name),
            },
            PrincipalTypeWire::Group => PrincipalKind::Group {
                display_name: record.group.and_then(|g| g.display_name),
            },
            PrincipalTypeWire::Service => PrincipalKind::Service {
                name: record.service.and_then(|s| s.name),
            },
            PrincipalTypeWire::Unspecified => PrincipalKind::Unspecified,
        };
        Self {
            id: record.id,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iam_core::MemberType;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Principal {
        serde_json::from_value::<PrincipalRecord>(value).unwrap().into()
    }

    #[test]
    fn user_with_details() {
        let p = decode(json!({"id": "u1", "type": "USER", "user": {"full_name": "Ada"}}));
        assert_eq!(p, Principal::user("u1", Some("Ada".into())));
        assert_eq!(p.member_type().unwrap(), MemberType::User);
    }

    #[test]
    fn service_maps_to_service_principal() {
        let p = decode(json!({"id": "s1", "type": "SERVICE", "service": {"name": "billing"}}));
        assert_eq!(p.member_type().unwrap(), MemberType::ServicePrincipal);
        assert_eq!(p.display_name().unwrap(), Some("billing"));
    }

    #[test]
    fn basic_view_has_no_details() {
        let p = decode(json!({"id": "g1", "type": "GROUP"}));
        assert_eq!(p, Principal::group("g1", None));
    }

    #[test]
    fn unknown_or_missing_type_is_unspecified() {
        assert_eq!(
            decode(json!({"id": "x", "type": "ROBOT"})),
            Principal::unspecified("x")
        );
        assert_eq!(decode(json!({"id": "y"})), Principal::unspecified("y"));
    }

    #[test]
    fn request_omits_absent_page_token() {
        let ids = vec!["u1".to_string()];
        let body = serde_json::to_value(BatchGetPrincipalsRequest {
            principal_ids: &ids,
            view: PrincipalView::Full,
            page_token: None,
        })
        .unwrap();
        assert_eq!(body, json!({"principal_ids": ["u1"], "view": "FULL"}));
    }
}
