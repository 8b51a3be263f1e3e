use crate::condition::{unique_by_type, Condition};
use crate::constants::{CONDITIONS, CONDITION_READY, SPEC, STATUS, WRITE_CONNECTION_SECRET_TO_REF};
use crate::document::{document_at, type_name, Document, FieldPath};
use crate::error::{self, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{DynamicObject, ObjectMeta, TypeMeta};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::{Display, Formatter};

/// The name, namespace and uid of a requirement. The uid is assigned by the store when the object
/// is created and never reused.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Identity {
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// Addresses a namespaced object in a store.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct ObjectKey {
    pub name: String,
    pub namespace: String,
}

impl ObjectKey {
    pub fn new<S1, S2>(name: S1, namespace: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The secret a requirement wants its connection details written to.
pub type SecretReference = ObjectKey;

/// A view over a semi-structured requirement object, local or remote. The object itself is a
/// `kube` `DynamicObject`, so any requirement kind can be handled without a compiled-in schema.
/// Accessors return owned `Document`s so that callers can edit them and write them back with the
/// matching setter.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct Requirement {
    object: DynamicObject,
}

impl Default for Requirement {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DynamicObject> for Requirement {
    fn from(object: DynamicObject) -> Self {
        Self { object }
    }
}

impl From<Requirement> for DynamicObject {
    fn from(requirement: Requirement) -> Self {
        requirement.object
    }
}

impl Requirement {
    /// An empty requirement with no identity, spec or status.
    pub fn new() -> Self {
        Self {
            object: DynamicObject {
                types: None,
                metadata: ObjectMeta::default(),
                data: Value::Object(Document::new()),
            },
        }
    }

    /// Build a requirement from a JSON representation of the whole object.
    pub fn from_value(value: Value) -> Result<Self> {
        let object = serde_json::from_value::<DynamicObject>(value)
            .context(error::ObjectConversionSnafu { what: "requirement" })?;
        Ok(Self { object })
    }

    pub fn metadata(&self) -> &ObjectMeta {
        &self.object.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.object.metadata
    }

    pub fn types(&self) -> Option<&TypeMeta> {
        self.object.types.as_ref()
    }

    pub fn set_types(&mut self, types: Option<TypeMeta>) {
        self.object.types = types;
    }

    /// Returns the object name, unwrapping a potential `None` with `""`.
    pub fn name(&self) -> &str {
        self.object.metadata.name.as_deref().unwrap_or("")
    }

    pub fn namespace(&self) -> &str {
        self.object.metadata.namespace.as_deref().unwrap_or("")
    }

    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name().to_string(),
            namespace: self.namespace().to_string(),
            uid: self.object.metadata.uid.clone().unwrap_or_default(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.name(), self.namespace())
    }

    /// Get a copy of the `spec` subtree. A missing `spec` is an empty document.
    pub fn spec(&self) -> Result<Document> {
        document_at(self.field(SPEC), SPEC)
    }

    pub fn set_spec(&mut self, spec: Document) {
        self.set_field(SPEC, Value::Object(spec));
    }

    /// Get a copy of the `status` subtree. A missing `status` is an empty document.
    pub fn status(&self) -> Result<Document> {
        document_at(self.field(STATUS), STATUS)
    }

    pub fn set_status(&mut self, status: Document) {
        self.set_field(STATUS, Value::Object(status));
    }

    /// Get a copy of the `status` subtree, checking that `status.conditions` is a list when
    /// present. The conditions themselves are left as they are, so the copy carries every field
    /// the writer put there.
    pub fn checked_status(&self) -> Result<Document> {
        let status = self.status()?;
        condition_list(&status)?;
        Ok(status)
    }

    /// Get the `status.conditions` list.
    pub fn conditions(&self) -> Result<Vec<Condition>> {
        let status = self.status()?;
        let conditions = Value::Array(condition_list(&status)?.to_vec());
        Ok(serde_json::from_value(conditions).context(
            error::ConditionDeserializationSnafu {
                path: "status.conditions",
            },
        )?)
    }

    /// Replace the `status.conditions` list. Conditions sharing a type are collapsed so that the
    /// set holds at most one condition per type.
    pub fn set_conditions(&mut self, conditions: Vec<Condition>) -> Result<()> {
        let mut status = self.status()?;
        let conditions = serde_json::to_value(unique_by_type(conditions))
            .context(error::ConditionSerializationSnafu)?;
        status.insert(CONDITIONS.to_string(), conditions);
        self.set_status(status);
        Ok(())
    }

    /// Set `condition`, replacing any existing condition of the same type. The transition time of
    /// the existing condition is kept when nothing else changed.
    pub fn set_condition(&mut self, condition: Condition) -> Result<()> {
        let mut conditions = self.conditions()?;
        match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
            Some(existing) if existing.equal(&condition) => return Ok(()),
            Some(existing) => *existing = condition,
            None => conditions.push(condition),
        }
        self.set_conditions(conditions)
    }

    /// Whether the `Ready` condition is `True`. A requirement with malformed conditions is not
    /// ready.
    pub fn is_ready(&self) -> bool {
        let status = match self.status() {
            Ok(status) => status,
            Err(_) => return false,
        };
        condition_list(&status)
            .map(|conditions| {
                conditions.iter().any(|c| {
                    c.get("type").and_then(Value::as_str) == Some(CONDITION_READY)
                        && c.get("status").and_then(Value::as_str) == Some("True")
                })
            })
            .unwrap_or(false)
    }

    /// The name of the secret this requirement wants its connection details written to, taken
    /// from `spec.writeConnectionSecretToRef.name`. Empty names count as absent.
    pub fn desired_secret_name(&self) -> Option<&str> {
        let spec = self.field(SPEC)?.as_object()?;
        FieldPath::new([WRITE_CONNECTION_SECRET_TO_REF, "name"])
            .get(spec)?
            .as_str()
            .filter(|name| !name.is_empty())
    }

    /// The secret this requirement writes its connection details to. The namespace defaults to
    /// the requirement's own namespace.
    pub fn secret_reference(&self) -> Option<SecretReference> {
        let name = self.desired_secret_name()?;
        let namespace = self
            .field(SPEC)
            .and_then(Value::as_object)
            .and_then(|spec| {
                FieldPath::new([WRITE_CONNECTION_SECRET_TO_REF, "namespace"]).get(spec)
            })
            .and_then(Value::as_str)
            .filter(|namespace| !namespace.is_empty())
            .unwrap_or_else(|| self.namespace());
        Some(ObjectKey::new(name, namespace))
    }

    /// An owner reference that marks this requirement as the controller of another object.
    pub fn controller_reference(&self) -> OwnerReference {
        let types = self.types().cloned().unwrap_or_default();
        OwnerReference {
            api_version: types.api_version,
            kind: types.kind,
            name: self.name().to_string(),
            uid: self.object.metadata.uid.clone().unwrap_or_default(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.object.data.as_object()?.get(key)
    }

    fn set_field(&mut self, key: &str, value: Value) {
        match &mut self.object.data {
            Value::Object(map) => {
                map.insert(key.to_string(), value);
            }
            other => {
                let mut map = Document::new();
                map.insert(key.to_string(), value);
                *other = Value::Object(map);
            }
        }
    }
}

/// The raw `conditions` list of `status`. A missing or `null` list is empty.
fn condition_list(status: &Document) -> Result<&[Value]> {
    match status.get(CONDITIONS) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(conditions)) => Ok(conditions),
        Some(other) => Err(error::MalformedFieldSnafu {
            path: "status.conditions",
            expected: "a list",
            got: type_name(other),
        }
        .build()
        .into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::condition::ConditionStatus;
    use serde_json::json;

    fn requirement() -> Requirement {
        Requirement::from_value(json!({
            "apiVersion": "database.example.org/v1alpha1",
            "kind": "PostgreSQLInstanceRequirement",
            "metadata": {
                "name": "local-name",
                "namespace": "local-namespace",
                "uid": "local-uid",
            },
            "spec": {
                "writeConnectionSecretToRef": {"name": "local-s-name"},
                "random-field": "random-val",
            },
        }))
        .unwrap()
    }

    #[test]
    fn identity() {
        let r = requirement();
        assert_eq!(
            r.identity(),
            Identity {
                name: "local-name".into(),
                namespace: "local-namespace".into(),
                uid: "local-uid".into(),
            }
        );
        assert_eq!(r.key().to_string(), "local-namespace/local-name");
    }

    #[test]
    fn secret_reference_defaults_namespace() {
        let r = requirement();
        assert_eq!(r.desired_secret_name(), Some("local-s-name"));
        assert_eq!(
            r.secret_reference(),
            Some(ObjectKey::new("local-s-name", "local-namespace"))
        );
        assert_eq!(Requirement::new().desired_secret_name(), None);
        assert_eq!(Requirement::new().secret_reference(), None);
    }

    #[test]
    fn secret_reference_explicit_namespace() {
        let mut r = requirement();
        let mut spec = r.spec().unwrap();
        spec.insert(
            "writeConnectionSecretToRef".into(),
            json!({"name": "s", "namespace": "other"}),
        );
        r.set_spec(spec);
        assert_eq!(r.secret_reference(), Some(ObjectKey::new("s", "other")));
    }

    #[test]
    fn conditions_round_trip_through_status() {
        let mut r = requirement();
        assert!(r.conditions().unwrap().is_empty());
        assert!(!r.is_ready());
        r.set_conditions(vec![Condition::available()]).unwrap();
        assert!(r.is_ready());
        let conditions = r.conditions().unwrap();
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].equal(&Condition::available()));
    }

    #[test]
    fn set_condition_replaces_same_type() {
        let mut r = requirement();
        r.set_condition(Condition {
            type_: "Ready".to_string(),
            status: ConditionStatus::False,
            reason: "Creating".to_string(),
            ..Condition::default()
        })
        .unwrap();
        r.set_condition(Condition::reconcile_error("boom")).unwrap();
        r.set_condition(Condition::available()).unwrap();
        let conditions = r.conditions().unwrap();
        assert_eq!(conditions.len(), 2);
        assert!(conditions[0].equal(&Condition::available()));
    }

    #[test]
    fn malformed_status() {
        let r = Requirement::from_value(json!({
            "metadata": {"name": "n"},
            "status": ["not", "an", "object"],
        }))
        .unwrap();
        assert!(r.status().is_err());
        assert!(r.conditions().is_err());
        assert!(!r.is_ready());

        let r = Requirement::from_value(json!({
            "metadata": {"name": "n"},
            "status": {"conditions": "Available"},
        }))
        .unwrap();
        assert!(r.status().is_ok());
        assert!(r.conditions().is_err());
    }

    #[test]
    fn checked_status_is_verbatim() {
        let r = Requirement::from_value(json!({
            "metadata": {"name": "n"},
            "status": {
                "phase": "Bound",
                "conditions": [{
                    "type": "Ready",
                    "lastTransitionTime": "2020-01-01T00:00:00.123456Z",
                    "observedGeneration": 3,
                }],
            },
        }))
        .unwrap();
        assert_eq!(
            Value::Object(r.checked_status().unwrap()),
            json!({
                "phase": "Bound",
                "conditions": [{
                    "type": "Ready",
                    "lastTransitionTime": "2020-01-01T00:00:00.123456Z",
                    "observedGeneration": 3,
                }],
            })
        );
        // A condition without a status is not ready, but it is not malformed either.
        assert!(!r.is_ready());

        let r = Requirement::from_value(json!({
            "metadata": {"name": "n"},
            "status": {"conditions": {"type": "Ready"}},
        }))
        .unwrap();
        assert!(r.checked_status().is_err());
    }

    #[test]
    fn ready_from_raw_conditions() {
        let r = Requirement::from_value(json!({
            "metadata": {"name": "n"},
            "status": {"conditions": [
                {"type": "Synced", "status": "False"},
                {"type": "Ready", "status": "True", "observedGeneration": 2},
            ]},
        }))
        .unwrap();
        assert!(r.is_ready());
    }

    #[test]
    fn controller_reference() {
        let reference = requirement().controller_reference();
        assert_eq!(reference.api_version, "database.example.org/v1alpha1");
        assert_eq!(reference.kind, "PostgreSQLInstanceRequirement");
        assert_eq!(reference.name, "local-name");
        assert_eq!(reference.uid, "local-uid");
        assert_eq!(reference.controller, Some(true));
    }
}
