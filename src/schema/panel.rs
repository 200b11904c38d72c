//! Property panel state for the selected element or the form
//!
//! The panel keeps a snapshot of the target's properties, renders field
//! views from the schema, and writes every edit straight through the store.
//! Validation errors are shown per field; they only block [`PropertyPanel::submit`].
//!
//! The panel holds no store subscription. [`PropertyPanel::sync`] compares
//! the snapshot with the store, so a panel that is never synced costs nothing.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{ElementId, ElementType, PropertyMap, PropertyValue};
use crate::store::{ElementStore, Storage};

use super::definition::{PropertyKind, Schema, SelectOption};
use super::registry::SchemaRegistry;
use super::validate::{validate_field, validate_properties, ValidationResult};

/// What the panel edits
#[derive(Debug, Clone, PartialEq)]
pub enum PanelTarget {
    Element { id: ElementId, element_type: ElementType },
    Form,
}

/// One field as the panel renders it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub section: String,
    pub group: String,
    pub name: String,
    pub label: String,
    pub kind: PropertyKind,
    pub value: PropertyValue,
    pub options: Vec<SelectOption>,
    pub visible: bool,
    pub errors: Vec<String>,
}

/// Result of comparing the panel snapshot with the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSync {
    Unchanged,
    Refreshed,
    /// The target element is gone; the panel should close
    Closed,
}

pub struct PropertyPanel {
    target: PanelTarget,
    values: PropertyMap,
    errors: BTreeMap<String, Vec<String>>,
}

impl PropertyPanel {
    /// Open a panel for an element; `None` if the element does not exist
    pub fn for_element<S: Storage>(store: &ElementStore<S>, id: &ElementId) -> Option<Self> {
        let element_type = store.element(id)?.element_type;
        Some(Self::open(
            store,
            PanelTarget::Element {
                id: id.clone(),
                element_type,
            },
        ))
    }

    /// Open a panel for the form-level properties
    pub fn for_form<S: Storage>(store: &ElementStore<S>) -> Self {
        Self::open(store, PanelTarget::Form)
    }

    fn open<S: Storage>(store: &ElementStore<S>, target: PanelTarget) -> Self {
        let mut panel = Self {
            target,
            values: PropertyMap::new(),
            errors: BTreeMap::new(),
        };
        panel.refresh(store);
        panel
    }

    pub fn target(&self) -> &PanelTarget {
        &self.target
    }

    /// Snapshot of the target's stored properties
    pub fn values(&self) -> &PropertyMap {
        &self.values
    }

    pub fn schema<'r>(&self, registry: &'r SchemaRegistry) -> Option<&'r Schema> {
        match &self.target {
            PanelTarget::Element { element_type, .. } => registry.schema(*element_type),
            PanelTarget::Form => Some(registry.form_schema()),
        }
    }

    /// Field views in panel order
    pub fn fields(&self, registry: &SchemaRegistry) -> Vec<FieldView> {
        let Some(schema) = self.schema(registry) else {
            return Vec::new();
        };
        let effective = schema.effective_values(&self.values);

        let mut views = Vec::new();
        for section in &schema.sections {
            for group in &section.groups {
                for definition in &group.properties {
                    views.push(FieldView {
                        section: section.name.clone(),
                        group: group.name.clone(),
                        name: definition.name.clone(),
                        label: definition.label.clone(),
                        kind: definition.kind,
                        value: definition.effective_value(&self.values),
                        options: definition.options.clone(),
                        visible: definition.is_visible(&effective),
                        errors: self.errors.get(&definition.name).cloned().unwrap_or_default(),
                    });
                }
            }
        }
        views
    }

    /// Current errors of one field
    pub fn errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(|e| e.as_slice()).unwrap_or(&[])
    }

    /// Write a field through the store and re-validate it
    ///
    /// The write always happens, valid or not. Returns the field's errors.
    pub fn set_field<S: Storage>(
        &mut self,
        store: &mut ElementStore<S>,
        registry: &SchemaRegistry,
        field: &str,
        value: PropertyValue,
    ) -> Vec<String> {
        let mut partial = PropertyMap::new();
        partial.insert(field.to_string(), value);
        match &self.target {
            PanelTarget::Element { id, .. } => store.update_element_properties(id, partial),
            PanelTarget::Form => store.update_form_properties(partial),
        };
        self.refresh(store);

        let errors = self
            .schema(registry)
            .and_then(|schema| {
                let definition = schema.definition(field)?;
                Some(validate_field(schema, definition, &self.values))
            })
            .unwrap_or_default();

        debug!(field, errors = errors.len(), "panel field edited");
        if errors.is_empty() {
            self.errors.remove(field);
        } else {
            self.errors.insert(field.to_string(), errors.clone());
        }
        errors
    }

    /// Re-read the target's properties; `false` if the target is gone
    pub fn refresh<S: Storage>(&mut self, store: &ElementStore<S>) -> bool {
        match self.stored_values(store).cloned() {
            Some(values) => {
                self.values = values;
                true
            }
            None => false,
        }
    }

    /// Follow changes made to the target since the last look
    ///
    /// Call this whenever the store may have changed under the panel.
    pub fn sync<S: Storage>(&mut self, store: &ElementStore<S>) -> PanelSync {
        match self.stored_values(store) {
            None => {
                debug!(target = ?self.target, "panel target removed");
                PanelSync::Closed
            }
            Some(values) if values == &self.values => PanelSync::Unchanged,
            Some(values) => {
                self.values = values.clone();
                PanelSync::Refreshed
            }
        }
    }

    fn stored_values<'s, S: Storage>(
        &self,
        store: &'s ElementStore<S>,
    ) -> Option<&'s PropertyMap> {
        match &self.target {
            PanelTarget::Element { id, .. } => store.properties(id),
            PanelTarget::Form => Some(&store.state().form_properties),
        }
    }

    /// Validate every visible field; only this step is blocked by errors
    pub fn submit(&mut self, registry: &SchemaRegistry) -> Result<(), ValidationResult> {
        let Some(schema) = self.schema(registry) else {
            return Ok(());
        };
        let element_id = match &self.target {
            PanelTarget::Element { id, .. } => Some(id),
            PanelTarget::Form => None,
        };
        let result = validate_properties(schema, element_id, &self.values);

        self.errors.clear();
        for error in &result.errors {
            self.errors
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }

        if result.is_valid() {
            Ok(())
        } else {
            Err(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementType};

    fn setup() -> (ElementStore, SchemaRegistry, ElementId) {
        let registry = SchemaRegistry::builtin();
        let mut store = ElementStore::in_memory();
        let element = registry.create_element(ElementType::Input);
        let id = element.id.clone();
        store.add_element(element, 0, 0);
        (store, registry, id)
    }

    #[test]
    fn test_fields_follow_schema_order_and_visibility() {
        let (store, registry, id) = setup();
        let panel = PropertyPanel::for_element(&store, &id).unwrap();
        let fields = panel.fields(&registry);
        assert_eq!(fields[0].name, "label");
        assert_eq!(fields[0].value, PropertyValue::from("Text Input"));

        let min = fields.iter().find(|f| f.name == "min").unwrap();
        assert!(!min.visible);
        let min_length = fields.iter().find(|f| f.name == "minLength").unwrap();
        assert!(min_length.visible);
    }

    #[test]
    fn test_invalid_edit_is_written_but_reported() {
        let (mut store, registry, id) = setup();
        let mut panel = PropertyPanel::for_element(&store, &id).unwrap();
        let errors = panel.set_field(&mut store, &registry, "label", "".into());
        assert_eq!(errors, vec!["Label is required"]);
        assert_eq!(
            store.properties(&id).unwrap().get("label"),
            Some(&PropertyValue::from(""))
        );
        assert_eq!(panel.errors("label"), ["Label is required".to_string()]);
        assert!(panel.submit(&registry).is_err());

        assert!(panel.set_field(&mut store, &registry, "label", "Email".into()).is_empty());
        assert!(panel.errors("label").is_empty());
        assert!(panel.submit(&registry).is_ok());
    }

    #[test]
    fn test_sync_follows_external_changes() {
        let (mut store, _registry, id) = setup();
        let mut panel = PropertyPanel::for_element(&store, &id).unwrap();
        assert_eq!(panel.sync(&store), PanelSync::Unchanged);

        store.set_property(&id, "placeholder", "you@example.com");
        assert_eq!(panel.sync(&store), PanelSync::Refreshed);
        assert_eq!(
            panel.values().get("placeholder"),
            Some(&PropertyValue::from("you@example.com"))
        );

        store.add_element(Element::new("other", ElementType::Button), 0, 1);
        assert_eq!(panel.sync(&store), PanelSync::Unchanged);

        store.remove_element(&id);
        assert_eq!(panel.sync(&store), PanelSync::Closed);
    }

    #[test]
    fn test_idle_panel_holds_no_subscription() {
        let (mut store, _registry, id) = setup();
        let mut panel = PropertyPanel::for_element(&store, &id).unwrap();
        assert_eq!(store.subscriber_count(), 0);

        for i in 0..50 {
            store.set_property(&id, "placeholder", format!("hint {}", i));
        }
        assert_eq!(panel.sync(&store), PanelSync::Refreshed);
        assert_eq!(
            panel.values().get("placeholder"),
            Some(&PropertyValue::from("hint 49"))
        );
        assert_eq!(panel.sync(&store), PanelSync::Unchanged);
    }

    #[test]
    fn test_form_panel_edits_form_properties() {
        let (mut store, registry, _) = setup();
        let mut panel = PropertyPanel::for_form(&store);
        assert!(panel
            .set_field(&mut store, &registry, "title", "Signup".into())
            .is_empty());
        assert_eq!(
            store.state().form_properties.get("title"),
            Some(&PropertyValue::from("Signup"))
        );
        let errors = panel.set_field(&mut store, &registry, "labelPosition", "bottom".into());
        assert_eq!(errors, vec!["Label Position must be one of: top, left, hidden"]);
    }
}
