// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshaller Integration Tests
//!
//! End-to-end marshal/unmarshal through the public API:
//! - Round-trips of nested graphs
//! - Shared references, cycles and reference id numbering
//! - Required / nillable rules in both directions
//! - Document prolog handling, encodings, streams
//! - Lenient vs strict child matching, polymorphic children
//! - Lifecycle callbacks and proxy types

use chrono::NaiveDate;
use oxm::mapping::{FieldDescriptor, FieldNode, LifecycleEvent};
use oxm::types::{ConversionError, TypeConverter, TypeRegistry};
use oxm::{
    MappedObject, MappedTypeBuilder, MappingRegistry, MarshallerConfig, ObjectGraph, ObjectId,
    OxmError, Value, XmlMarshaller,
};
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn registry() -> MappingRegistry {
    let shape = MappedTypeBuilder::new("Shape")
        .attribute("label", "string")
        .build();
    let circle = MappedTypeBuilder::new("Circle")
        .attribute("radius", "float")
        .inherit(&shape)
        .build();

    let types = vec![
        MappedTypeBuilder::new("Address")
            .text("street", "string")
            .text("city", "string")
            .text("state", "string")
            .build(),
        MappedTypeBuilder::new("CustomerContact")
            .attribute("email", "string")
            .build(),
        MappedTypeBuilder::new("User")
            .field(FieldDescriptor::new("id", FieldNode::Attribute, "integer").required())
            .field(FieldDescriptor::new("name", FieldNode::Text, "string").required())
            .field(FieldDescriptor::new("nickname", FieldNode::Text, "string").nillable())
            .element("address", "Address")
            .element_list("contacts", "CustomerContact")
            .build(),
        MappedTypeBuilder::new("Simple").build(),
        MappedTypeBuilder::new("SimpleCompound").build(),
        MappedTypeBuilder::new("SimpleWithField")
            .attribute("id", "integer")
            .build(),
        MappedTypeBuilder::new("Leaf")
            .attribute("name", "string")
            .build(),
        MappedTypeBuilder::new("Pair")
            .element("left", "Leaf")
            .element("right", "Leaf")
            .build(),
        MappedTypeBuilder::new("Node")
            .attribute("name", "string")
            .element("next", "Node")
            .build(),
        MappedTypeBuilder::new("Order")
            .attribute("id", "integer")
            .field(
                FieldDescriptor::new("product_type", FieldNode::Text, "string")
                    .with_wire_name("productType"),
            )
            .text("placed", "datetime")
            .text("status", "string")
            .on(LifecycleEvent::PreMarshal, |order| {
                if order.get("status").is_none() {
                    order.set("status", "new");
                }
            })
            .on(LifecycleEvent::PostMarshal, |order| order.set("marshalled", true))
            .on(LifecycleEvent::PreUnmarshal, |order| order.set("status", "draft"))
            .on(LifecycleEvent::PostUnmarshal, |order| order.set("loaded", true))
            .build(),
        MappedTypeBuilder::new("Book")
            .namespace("urn:example:books", None)
            .attribute("isbn", "string")
            .text("title", "string")
            .build(),
        MappedTypeBuilder::new("Drawing")
            .attribute("title", "string")
            .element("shape", "Shape")
            .build(),
        shape,
        circle,
    ];

    let mut registry = MappingRegistry::new();
    for ty in types {
        registry.register(ty).expect("register mapped type");
    }
    registry.validate().expect("parents registered");
    registry
}

fn marshaller() -> XmlMarshaller {
    init_logging();
    XmlMarshaller::new(registry())
}

fn text_of<'a>(graph: &'a ObjectGraph, id: ObjectId, field: &str) -> Option<&'a str> {
    graph.get(id)?.get(field)?.as_str()
}

fn user_graph() -> (ObjectGraph, ObjectId) {
    let mut graph = ObjectGraph::new();
    let address = graph.insert(
        MappedObject::new("Address")
            .with("street", "123 Waverly Way")
            .with("city", "New Haven")
            .with("state", "Insanity"),
    );
    let first = graph.insert(MappedObject::new("CustomerContact").with("email", "no@way.com"));
    let second = graph.insert(MappedObject::new("CustomerContact").with("email", "other@way.com"));
    let user = graph.insert(
        MappedObject::new("User")
            .with("id", 1)
            .with("name", "Malcolm")
            .with("nickname", "Mal")
            .with("address", address)
            .with("contacts", vec![first, second]),
    );
    (graph, user)
}

#[test]
fn test_first_class_roundtrip() {
    let m = marshaller();
    let (mut graph, user) = user_graph();

    let xml = m.marshal_to_string(&mut graph, user).expect("marshal");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

    let mut read = ObjectGraph::new();
    let other = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");

    assert!(ObjectGraph::deep_eq(&graph, user, &read, other));
    assert_eq!(read.get(other).map(MappedObject::type_name), Some("User"));
    assert_eq!(text_of(&read, other, "name"), Some("Malcolm"));

    let address = read
        .get(other)
        .and_then(|u| u.get("address"))
        .and_then(Value::as_object)
        .expect("address reference");
    assert_eq!(text_of(&read, address, "street"), Some("123 Waverly Way"));
    assert_eq!(text_of(&read, address, "state"), Some("Insanity"));

    let contacts = read
        .get(other)
        .and_then(|u| u.get("contacts"))
        .and_then(Value::as_list)
        .expect("contacts");
    assert_eq!(contacts.len(), 2);
}

#[test]
fn test_exact_nested_layout() {
    let m = marshaller();
    let (mut graph, user) = user_graph();

    let xml = m.marshal_to_string(&mut graph, user).expect("marshal");
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<user repositoryBy="0" id="1">
    <name>Malcolm</name>
    <nickname>Mal</nickname>
    <address repositoryBy="1">
        <street>123 Waverly Way</street>
        <city>New Haven</city>
        <state>Insanity</state>
    </address>
    <customer-contact repositoryBy="2" email="no@way.com"/>
    <customer-contact repositoryBy="3" email="other@way.com"/>
</user>"#;
    assert_eq!(xml, expected);
}

#[test]
fn test_shared_reference_written_once() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let b = graph.insert(MappedObject::new("Leaf").with("name", "b"));
    let a = graph.insert(MappedObject::new("Pair").with("left", b).with("right", b));

    let xml = m.marshal_to_string(&mut graph, a).expect("marshal");
    let full = xml.find(r#"<leaf repositoryBy="1" name="b"/>"#).expect("full body");
    let bare = xml.find(r#"<leaf repositoryBy="1"/>"#).expect("bare reference");
    assert!(full < bare);

    let mut read = ObjectGraph::new();
    let pair = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let pair = read.get(pair).expect("pair");
    let left = pair.get("left").and_then(Value::as_object).expect("left");
    let right = pair.get("right").and_then(Value::as_object).expect("right");

    assert_eq!(left, right);
    assert_eq!(read.len(), 2);
    assert_eq!(text_of(&read, left, "name"), Some("b"));
}

#[test]
fn test_same_typed_fields_keep_their_slots() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let one = graph.insert(MappedObject::new("Leaf").with("name", "one"));
    let two = graph.insert(MappedObject::new("Leaf").with("name", "two"));
    let pair = graph.insert(MappedObject::new("Pair").with("left", one).with("right", two));

    let xml = m.marshal_to_string(&mut graph, pair).expect("marshal");
    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");

    let slot = |field: &str| {
        read.get(back)
            .and_then(|p| p.get(field))
            .and_then(Value::as_object)
            .and_then(|leaf| text_of(&read, leaf, "name"))
    };
    assert_eq!(slot("left"), Some("one"));
    assert_eq!(slot("right"), Some("two"));
    assert!(ObjectGraph::deep_eq(&graph, pair, &read, back));
}

#[test]
fn test_back_reference_fills_next_slot() {
    let m = marshaller();
    let doc = r#"<pair repositoryBy="0"><leaf repositoryBy="1" name="b"/><leaf repositoryBy="1"/></pair>"#;
    let mut graph = ObjectGraph::new();
    let pair = m.unmarshal_from_string(doc, &mut graph).expect("unmarshal");

    let pair = graph.get(pair).expect("pair");
    let left = pair.get("left").and_then(Value::as_object).expect("left");
    assert_eq!(pair.get("right").and_then(Value::as_object), Some(left));
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_bound_reference_body_is_skipped() {
    let m = marshaller();
    let doc = r#"<pair repositoryBy="0">
        <leaf repositoryBy="1" name="b"/>
        <leaf repositoryBy="1" name="ignored"><leaf><deep/></leaf>stray text</leaf>
    </pair>"#;
    let mut graph = ObjectGraph::new();
    let pair = m.unmarshal_from_string(doc, &mut graph).expect("unmarshal");

    let pair = graph.get(pair).expect("pair");
    let left = pair.get("left").and_then(Value::as_object).expect("left");
    assert_eq!(pair.get("right").and_then(Value::as_object), Some(left));
    assert_eq!(text_of(&graph, left, "name"), Some("b"));
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_distinct_equal_objects_not_merged() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let b1 = graph.insert(MappedObject::new("Leaf").with("name", "same"));
    let b2 = graph.insert(MappedObject::new("Leaf").with("name", "same"));
    let a = graph.insert(MappedObject::new("Pair").with("left", b1).with("right", b2));

    let xml = m.marshal_to_string(&mut graph, a).expect("marshal");
    assert!(xml.contains(r#"<leaf repositoryBy="1" name="same"/>"#));
    assert!(xml.contains(r#"<leaf repositoryBy="2" name="same"/>"#));

    let mut read = ObjectGraph::new();
    let pair = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let pair = read.get(pair).expect("pair");
    assert_ne!(pair.get("left"), pair.get("right"));
}

#[test]
fn test_cycle_terminates_both_ways() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let first = graph.insert(MappedObject::new("Node").with("name", "first"));
    let second = graph.insert(
        MappedObject::new("Node")
            .with("name", "second")
            .with("next", first),
    );
    graph.get_mut(first).expect("first").set("next", second);

    let xml = m.marshal_to_string(&mut graph, first).expect("marshal");
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<node repositoryBy="0" name="first">
    <node repositoryBy="1" name="second">
        <node repositoryBy="0"/>
    </node>
</node>"#;
    assert_eq!(xml, expected);

    let mut read = ObjectGraph::new();
    let a = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let b = read
        .get(a)
        .and_then(|n| n.get("next"))
        .and_then(Value::as_object)
        .expect("next");
    let back = read
        .get(b)
        .and_then(|n| n.get("next"))
        .and_then(Value::as_object);

    assert_eq!(back, Some(a));
    assert_eq!(read.len(), 2);
    assert!(ObjectGraph::deep_eq(&graph, first, &read, a));
}

#[test]
fn test_ids_follow_preorder() {
    let m = marshaller();
    let (mut graph, user) = user_graph();
    let xml = m.marshal_to_string(&mut graph, user).expect("marshal");

    let positions: Vec<usize> = (0..4)
        .map(|i| {
            xml.find(&format!("repositoryBy=\"{}\"", i))
                .unwrap_or_else(|| panic!("missing id {}", i))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_required_field_on_marshal() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let user = graph.insert(MappedObject::new("User").with("id", 3));

    let err = m.marshal_to_string(&mut graph, user).unwrap_err();
    assert!(matches!(
        err,
        OxmError::FieldRequired { ref type_name, ref field } if type_name == "User" && field == "name"
    ));
}

#[test]
fn test_required_field_on_unmarshal() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();

    let err = m
        .unmarshal_from_string(r#"<user repositoryBy="0" id="1"/>"#, &mut graph)
        .unwrap_err();
    assert!(matches!(err, OxmError::FieldRequired { ref field, .. } if field == "name"));

    let err = m
        .unmarshal_from_string(
            r#"<user repositoryBy="0" id=""><name>Zoe</name></user>"#,
            &mut graph,
        )
        .unwrap_err();
    assert!(matches!(err, OxmError::FieldRequired { ref field, .. } if field == "id"));
}

#[test]
fn test_nillable_absent_written_empty() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let user = graph.insert(MappedObject::new("User").with("id", 9).with("name", "Zoe"));

    let xml = m.marshal_to_string(&mut graph, user).expect("marshal");
    assert!(xml.contains("<nickname/>"));
    // absent and not nillable leaves no trace
    assert!(!xml.contains("address"));
    assert!(!xml.contains("contacts"));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let back = read.get(back).expect("user");
    assert!(back.get("nickname").is_none());
    assert!(back.get("address").is_none());
}

#[test]
fn test_empty_text_is_not_null() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let user = m
        .unmarshal_from_string(
            r#"<user repositoryBy="0" id="1"><name></name><nickname/></user>"#,
            &mut graph,
        )
        .expect("unmarshal");

    assert_eq!(text_of(&graph, user, "name"), Some(""));
    assert!(graph.get(user).and_then(|u| u.get("nickname")).is_none());
}

#[test]
fn test_escaped_text_roundtrip() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let user = graph.insert(
        MappedObject::new("User")
            .with("id", 2)
            .with("name", "Mal & <Zoe> \"Serenity\""),
    );

    let xml = m.marshal_to_string(&mut graph, user).expect("marshal");
    assert!(xml.contains("&amp;"));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert_eq!(text_of(&read, back, "name"), Some("Mal & <Zoe> \"Serenity\""));
}

#[test]
fn test_minimal_document() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let simple = graph.create("Simple");

    let xml = m.marshal_to_string(&mut graph, simple).expect("marshal");
    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<simple repositoryBy=\"0\"/>"
    );

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert!(ObjectGraph::deep_eq(&graph, simple, &read, back));
}

#[test]
fn test_compound_type_name_element() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let simple = graph.create("SimpleCompound");

    let xml = m.marshal_to_string(&mut graph, simple).expect("marshal");
    assert!(xml.ends_with(r#"<simple-compound repositoryBy="0"/>"#));
}

#[test]
fn test_other_encoding_label() {
    init_logging();
    let m = XmlMarshaller::new(registry())
        .with_config(MarshallerConfig::default().encoding("iso-8859-1"));
    let mut graph = ObjectGraph::new();
    let simple = graph.insert(MappedObject::new("SimpleWithField").with("id", 5));

    let xml = m.marshal_to_string(&mut graph, simple).expect("marshal");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert_eq!(
        read.get(back).and_then(|o| o.get("id")),
        Some(&Value::Int(5))
    );
}

#[test]
fn test_declared_version() {
    init_logging();
    let m = XmlMarshaller::new(registry())
        .with_config(MarshallerConfig::default().xml_version("1.1"));
    let mut graph = ObjectGraph::new();
    let simple = graph.create("Simple");

    let xml = m.marshal_to_string(&mut graph, simple).expect("marshal");
    assert!(xml.starts_with("<?xml version=\"1.1\" encoding=\"UTF-8\"?>"));
    m.unmarshal_from_string(&xml, &mut ObjectGraph::new())
        .expect("unmarshal");
}

#[test]
fn test_default_namespace_binding() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let book = graph.insert(
        MappedObject::new("Book")
            .with("isbn", "0-441-56956-0")
            .with("title", "Serenity"),
    );

    let xml = m.marshal_to_string(&mut graph, book).expect("marshal");
    assert!(xml.contains(
        r#"<book xmlns="urn:example:books" repositoryBy="0" isbn="0-441-56956-0">"#
    ));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert!(ObjectGraph::deep_eq(&graph, book, &read, back));
}

#[test]
fn test_pre_unmarshal_defaults_are_overridden() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();

    let bare = m
        .unmarshal_from_string(r#"<order repositoryBy="0" id="4"/>"#, &mut graph)
        .expect("bare order");
    assert_eq!(text_of(&graph, bare, "status"), Some("draft"));

    let full = m
        .unmarshal_from_string(
            r#"<order repositoryBy="0" id="5"><status>shipped</status></order>"#,
            &mut graph,
        )
        .expect("full order");
    assert_eq!(text_of(&graph, full, "status"), Some("shipped"));
}

#[test]
fn test_handles_all_valid_prologs() {
    let m = marshaller();
    let documents = [
        r#"<?xml version="1.0" encoding="UTF-8"?><simple-with-field id="1"/>"#,
        r#" <?xml version="1.0" encoding="UTF-8"?><simple-with-field id="1"/>"#,
        " <?xml version=\"1.0\" encoding=\"UTF-8\"?><simple-with-field\n\n id=\"1\"/>",
        " <?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n<!-- comment -->\n<simple-with-field id=\"1\"/>\n\n",
        "<simple-with-field id=\"1\"></simple-with-field>",
    ];

    for doc in documents {
        let mut graph = ObjectGraph::new();
        let id = m
            .unmarshal_from_string(doc, &mut graph)
            .unwrap_or_else(|e| panic!("{:?} failed: {}", doc, e));
        assert_eq!(
            graph.get(id).and_then(|o| o.get("id")),
            Some(&Value::Int(1)),
            "document {:?}",
            doc
        );
    }
}

#[test]
fn test_malformed_documents() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();

    for doc in [
        "",
        "<simple-with-field id=\"1\">",
        "<simple-with-field id=\"1\"></other>",
        "<simple-with-field repositoryBy=\"zero\"/>",
    ] {
        let err = m.unmarshal_from_string(doc, &mut graph).unwrap_err();
        assert!(
            matches!(err, OxmError::DocumentParseFailure(_)),
            "{:?} gave {:?}",
            doc,
            err
        );
    }
}

#[test]
fn test_conversion_error_propagates() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let err = m
        .unmarshal_from_string(r#"<simple-with-field repositoryBy="0" id="abc"/>"#, &mut graph)
        .unwrap_err();
    assert!(matches!(
        err,
        OxmError::Conversion(ConversionError::InvalidValue { .. })
    ));

    let bad = graph.insert(MappedObject::new("SimpleWithField").with("id", "seven"));
    let err = m.marshal_to_string(&mut graph, bad).unwrap_err();
    assert!(matches!(
        err,
        OxmError::Conversion(ConversionError::TypeMismatch { .. })
    ));
}

#[test]
fn test_element_inside_leaf_is_invalid_state() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let err = m
        .unmarshal_from_string(
            r#"<user repositoryBy="0" id="1"><name><b/></name></user>"#,
            &mut graph,
        )
        .unwrap_err();
    assert!(matches!(err, OxmError::InvalidCursorState(_)));
}

#[test]
fn test_unexpected_child_lenient_and_strict() {
    let doc = r#"<simple-with-field repositoryBy="0" id="1"><junk a="b"><deep>x</deep></junk></simple-with-field>"#;

    let lenient = marshaller();
    let mut graph = ObjectGraph::new();
    let id = lenient.unmarshal_from_string(doc, &mut graph).expect("lenient");
    assert_eq!(
        graph.get(id).and_then(|o| o.get("id")),
        Some(&Value::Int(1))
    );

    let strict = marshaller().with_config(MarshallerConfig::default().strict(true));
    let err = strict
        .unmarshal_from_string(doc, &mut ObjectGraph::new())
        .unwrap_err();
    assert!(matches!(err, OxmError::UnknownMapping(name) if name == "junk"));
}

#[test]
fn test_polymorphic_child_assigned_to_supertype_field() {
    let m = marshaller();
    let mut graph = ObjectGraph::new();
    let circle = graph.insert(
        MappedObject::new("Circle")
            .with("label", "sun")
            .with("radius", 2.5),
    );
    let drawing = graph.insert(
        MappedObject::new("Drawing")
            .with("title", "sky")
            .with("shape", circle),
    );

    let xml = m.marshal_to_string(&mut graph, drawing).expect("marshal");
    assert!(xml.contains(r#"<circle repositoryBy="1" label="sun" radius="2.5"/>"#));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let shape = read
        .get(back)
        .and_then(|d| d.get("shape"))
        .and_then(Value::as_object)
        .expect("shape");
    assert_eq!(read.get(shape).map(MappedObject::type_name), Some("Circle"));
    assert_eq!(
        read.get(shape).and_then(|s| s.get("radius")),
        Some(&Value::Float(2.5))
    );
}

#[test]
fn test_lifecycle_callbacks() {
    let m = marshaller();
    let placed = NaiveDate::from_ymd_opt(2011, 3, 4)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .expect("timestamp");

    let mut graph = ObjectGraph::new();
    let order = graph.insert(
        MappedObject::new("Order")
            .with("id", 1)
            .with("product_type", "business cards")
            .with("placed", placed),
    );

    let xml = m.marshal_to_string(&mut graph, order).expect("marshal");
    assert!(xml.contains("<productType>business cards</productType>"));
    assert!(xml.contains("<placed>2011-03-04T12:30:00</placed>"));
    assert!(xml.contains("<status>new</status>"));
    assert!(!xml.contains("marshalled"));
    assert_eq!(text_of(&graph, order, "status"), Some("new"));
    assert_eq!(
        graph.get(order).and_then(|o| o.get("marshalled")),
        Some(&Value::Bool(true))
    );

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    let back = read.get(back).expect("order");
    assert_eq!(back.get("product_type").and_then(Value::as_str), Some("business cards"));
    assert_eq!(back.get("placed"), Some(&Value::DateTime(placed)));
    assert_eq!(back.get("loaded").and_then(Value::as_bool), Some(true));
}

#[test]
fn test_proxy_marshals_as_underlying_type() {
    init_logging();
    let mut registry = registry();
    registry.register_proxy("LeafProxy", "Leaf");
    let m = XmlMarshaller::new(registry);

    let mut graph = ObjectGraph::new();
    let proxy = graph.insert(MappedObject::new("LeafProxy").with("name", "lazy"));
    let xml = m.marshal_to_string(&mut graph, proxy).expect("marshal");
    assert!(xml.ends_with(r#"<leaf repositoryBy="0" name="lazy"/>"#));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert_eq!(read.get(back).map(MappedObject::type_name), Some("Leaf"));
}

struct UpperCase;

impl TypeConverter for UpperCase {
    fn name(&self) -> &str {
        "upper"
    }

    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError> {
        Ok(value.as_str().map(str::to_uppercase))
    }

    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError> {
        Ok(wire.map_or(Value::Null, |s| Value::from(s.to_lowercase())))
    }
}

#[test]
fn test_custom_converter() {
    init_logging();
    let mut types = TypeRegistry::with_builtins();
    types.add("upper", Arc::new(UpperCase)).expect("add converter");

    let mut registry = MappingRegistry::new();
    registry
        .register(MappedTypeBuilder::new("Tag").attribute("code", "upper").build())
        .expect("register");
    let m = XmlMarshaller::with_types(registry, Arc::new(types));

    let mut graph = ObjectGraph::new();
    let tag = graph.insert(MappedObject::new("Tag").with("code", "abc"));
    let xml = m.marshal_to_string(&mut graph, tag).expect("marshal");
    assert!(xml.contains(r#"code="ABC""#));

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_string(&xml, &mut read).expect("unmarshal");
    assert_eq!(text_of(&read, back, "code"), Some("abc"));
}

#[test]
fn test_stream_roundtrip() {
    let m = marshaller();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("user.xml");
    let (mut graph, user) = user_graph();

    let written = m
        .marshal_to_stream(&mut graph, user, &path)
        .expect("marshal to file");
    let on_disk = std::fs::metadata(&path).expect("metadata").len();
    assert_eq!(written as u64, on_disk);

    let mut read = ObjectGraph::new();
    let back = m.unmarshal_from_stream(&path, &mut read).expect("unmarshal");
    assert!(ObjectGraph::deep_eq(&graph, user, &read, back));
}

#[test]
fn test_stream_open_failure() {
    let m = marshaller();
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("no-such-dir").join("out.xml");
    let mut graph = ObjectGraph::new();
    let simple = graph.create("Simple");

    let err = m.marshal_to_stream(&mut graph, simple, &missing).unwrap_err();
    assert!(matches!(err, OxmError::StreamOpenFailure { .. }));

    let err = m.unmarshal_from_stream(&missing, &mut graph).unwrap_err();
    assert!(matches!(err, OxmError::StreamOpenFailure { .. }));
}
