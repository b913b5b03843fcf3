//! Integration tests for the reflection layer
//!
//! Tests verify:
//! - Class, method, property and parameter lookups against the fixture catalog
//! - Annotation values read through every reflected entity
//! - Alias resolution and ignore lists inherited from the class
//! - Instantiation and invocation through the registry
//! - Memoization of annotation sets and member lists

use docmeta_reflect::{
    Catalog, ClassDescriptor, Manifest, MethodDescriptor, Modifiers, ReflectionClass,
    ReflectionMethod, ReflectionProperty, TypeSource,
};
use docmeta_test_utils::fixtures::*;
use docmeta_test_utils::{
    mock_registry, CountingSource, DocmetaError, MockAnnotation, ReflectionConfig,
    ReflectionError, Value, MOCK_ANNOTATION,
};
use std::sync::Arc;

fn class(name: &str) -> ReflectionClass {
    ReflectionClass::new(name, fixture_source())
}

// ============================================================================
// CLASSES
// ============================================================================

#[test]
fn test_class_name() {
    let reflection = class(CLASS_TEST);
    assert_eq!(reflection.name(), CLASS_TEST);
    assert_eq!(reflection.short_name(), "ReflectionClassTest");
}

#[test]
fn test_class_annotation_values() {
    let reflection = class(CLASS_TEST);
    let mock = reflection.annotation("MockAnnotation").expect("annotation");

    assert_eq!(mock.value("name").and_then(Value::as_str), Some("MockAnnotation"));
    assert_eq!(mock.value("description").and_then(Value::as_str), Some("some description"));
    assert_eq!(mock.value("value").and_then(Value::as_str), Some("a value"));
    assert!(reflection.has_annotation("author"));
    assert!(reflection.has_annotation("license"));
}

#[test]
fn test_class_missing_annotation() {
    let reflection = class(CLASS_TEST);
    let err = reflection.annotation("Unknown").unwrap_err();
    assert_eq!(
        err,
        DocmetaError::Reflection(ReflectionError::AnnotationNotFound {
            name: "Unknown".to_string()
        })
    );
    assert!(!reflection.has_annotation("Unknown"));
}

#[test]
fn test_has_method_with_existing_method() {
    let reflection = class(CLASS_TEST);
    assert!(reflection.has_method("testGetMethodWithExistingMethod"));
    assert!(!reflection.has_method("someUnknownMethod"));
}

#[test]
fn test_get_method_with_existing_method() {
    let reflection = class(CLASS_TEST);
    let method = reflection.method("testGetMethodWithExistingMethod").expect("method");
    assert_eq!(method.class_name(), CLASS_TEST);
    assert_eq!(method.method_name(), "testGetMethodWithExistingMethod");
}

#[test]
fn test_get_method_with_exception() {
    let err = class(CLASS_TEST).method("someUnknownMethod").unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        DocmetaError::Reflection(ReflectionError::MethodNotFound { .. })
    ));
}

#[test]
fn test_inherited_members() {
    let reflection = class(CLASS_TEST);
    // setUp is redeclared, so the subclass declaration wins.
    let set_up = reflection.method("setUp").expect("setUp");
    assert_eq!(set_up.class_name(), CLASS_TEST);

    let assert_true = reflection.method("assertTrue").expect("assertTrue");
    assert_eq!(assert_true.class_name(), TEST_CASE);

    let backup = reflection.property("backupGlobals").expect("inherited property");
    assert_eq!(backup.class_name(), TEST_CASE);
}

#[test]
fn test_methods_filter() {
    let reflection = class(CLASS_TEST);
    let protected: Vec<String> = reflection
        .methods(Modifiers::PROTECTED)
        .expect("methods")
        .iter()
        .map(|m| m.method_name().to_string())
        .collect();
    assert_eq!(protected, vec!["setUp"]);

    let statics = reflection.methods(Modifiers::STATIC).expect("methods");
    assert_eq!(statics.len(), 1);
    assert_eq!(statics[0].method_name(), "assertTrue");

    let all = reflection.methods(Modifiers::ALL).expect("methods");
    assert_eq!(all.len(), 8);
    assert_eq!(all[0].method_name(), "setUp");
}

#[test]
fn test_methods_are_memoized_per_filter() {
    let reflection = class(CLASS_TEST);
    let first = reflection.methods(Modifiers::PUBLIC).expect("first");
    let second = reflection.methods(Modifiers::PUBLIC).expect("second");
    assert!(Arc::ptr_eq(&first, &second));

    let other = reflection.methods(Modifiers::PROTECTED).expect("other");
    assert!(!Arc::ptr_eq(&first, &other));
}

#[test]
fn test_has_property() {
    let reflection = class(CLASS_TEST);
    assert!(reflection.has_property("reflectionClass"));
    assert!(!reflection.has_property("someUnknownProperty"));
    assert!(matches!(
        reflection.property("someUnknownProperty"),
        Err(DocmetaError::Reflection(ReflectionError::PropertyNotFound { .. }))
    ));
}

#[test]
fn test_implements_interface() {
    let mock = class(MOCK_ANNOTATION);
    assert!(mock.implements_interface(OBJECT_INTERFACE).expect("check"));
    assert!(mock.implements_interface(SERIALIZABLE).expect("check"));
    assert!(!mock.implements_interface("Countable").expect("check"));
    assert!(!class(CLASS_TEST).implements_interface(SERIALIZABLE).expect("check"));
}

#[test]
fn test_class_kinds() {
    assert!(class(SERIALIZABLE).is_interface().expect("kind"));
    assert!(class(SERIALIZABLE).is_abstract().expect("kind"));
    assert!(class(TEST_CASE).is_abstract().expect("kind"));
    assert!(!class(TEST_CASE).is_interface().expect("kind"));
    assert!(!class(MOCK_ANNOTATION).is_abstract().expect("kind"));
}

#[test]
fn test_unknown_class() {
    let reflection = class("App\\Missing");
    assert!(matches!(
        reflection.descriptor(),
        Err(DocmetaError::Reflection(ReflectionError::ClassNotFound { .. }))
    ));
    assert!(reflection.methods(Modifiers::ALL).is_err());
}

// ============================================================================
// METHODS
// ============================================================================

#[test]
fn test_method_annotation() {
    let method = class(METHOD_TEST).method("testGetAnnotation").expect("method");
    let mock = method.annotation("MockAnnotation").expect("annotation");
    assert_eq!(mock.value("name").and_then(Value::as_str), Some("MockAnnotation"));
    assert_eq!(mock.value("value").and_then(Value::as_str), Some("a value"));
    assert!(method.has_annotation("return"));
}

#[test]
fn test_method_annotation_with_exception() {
    let method = class(METHOD_TEST)
        .method("testGetAnnotationWithException")
        .expect("method");
    assert!(method.annotation("MockAnnotation").unwrap_err().is_not_found());
    assert!(method.has_annotation("expectedException"));
}

#[test]
fn test_method_parameters() {
    let method = class(METHOD_TEST).method("methodWithTwoParameters").expect("method");
    let parameters = method.parameters().expect("parameters");
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].parameter_name(), "test0");
    assert_eq!(parameters[1].parameter_name(), "test1");
    assert_eq!(method.parameter("test1").expect("test1").position(), Ok(1));
    assert!(matches!(
        method.parameter("test2"),
        Err(DocmetaError::Reflection(ReflectionError::ParameterNotFound { .. }))
    ));
}

#[test]
fn test_method_modifiers() {
    let reflection = class(CLASS_TEST);
    assert_eq!(reflection.method("setUp").expect("setUp").modifiers(), Ok(Modifiers::PROTECTED));
    assert_eq!(
        reflection.method("assertTrue").expect("assertTrue").modifiers(),
        Ok(Modifiers::PUBLIC | Modifiers::STATIC)
    );
}

#[test]
fn test_method_invoke_with_args() {
    let registry = mock_registry();
    let annotation = class(METHOD_TEST)
        .method("testGetAnnotation")
        .expect("method")
        .annotation("MockAnnotation")
        .expect("annotation")
        .clone();
    let mock = MockAnnotation::new(annotation.values().clone());

    let get_value = ReflectionMethod::new(MOCK_ANNOTATION, "getValue", fixture_source());
    let result = get_value
        .invoke(&registry, &mock, [Value::from("description")])
        .expect("invoke");
    assert_eq!(result, Value::from("some description"));

    let missing = get_value
        .invoke_args(&registry, &mock, &[Value::from("absent")])
        .expect("invoke");
    assert_eq!(missing, Value::Null);
}

#[test]
fn test_method_invoke_unknown_handler() {
    let registry = mock_registry();
    let method = ReflectionMethod::new(MOCK_ANNOTATION, "__construct", fixture_source());
    assert!(method.invoke_args(&registry, &MockAnnotation::default(), &[]).is_err());
}

#[test]
fn test_method_display() {
    let method = ReflectionMethod::new(METHOD_TEST, "testInvokeWithArgs", fixture_source());
    assert_eq!(
        method.to_string(),
        format!("{}::testInvokeWithArgs", METHOD_TEST)
    );
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_property_annotation() {
    let property = class(PROPERTY_TEST).property("reflectionProperty").expect("property");
    assert_eq!(property.modifiers(), Ok(Modifiers::PROTECTED));
    assert!(property.has_annotation("var"));
    let mock = property.annotation("MockAnnotation").expect("annotation");
    assert_eq!(mock.value("description").and_then(Value::as_str), Some("some description"));
}

#[test]
fn test_property_without_doc() {
    let property = ReflectionProperty::new(PROPERTY_TEST, "undocumented", fixture_source());
    assert!(property.annotations().expect("annotations").is_empty());
    assert_eq!(property.modifiers(), Ok(Modifiers::PRIVATE));
}

#[test]
fn test_properties_filter() {
    let reflection = class(PROPERTY_TEST);
    assert_eq!(reflection.properties(Modifiers::PRIVATE).expect("private").len(), 1);
    assert_eq!(reflection.properties(Modifiers::PUBLIC).expect("public").len(), 0);
    assert_eq!(reflection.properties(Modifiers::ALL).expect("all").len(), 3);
}

// ============================================================================
// PARAMETERS
// ============================================================================

#[test]
fn test_parameter_position() {
    let reflection = class(PARAMETER_TEST);
    let one = reflection.method("methodWithOneParameter").expect("method");
    assert_eq!(one.parameter("test").expect("test").position(), Ok(0));

    let two = reflection.method("methodWithTwoParameters").expect("method");
    let positions: Vec<usize> = two
        .parameters()
        .expect("parameters")
        .iter()
        .map(|p| p.position().expect("position"))
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn test_parameter_display() {
    let method = class(PARAMETER_TEST).method("methodWithOneParameter").expect("method");
    let parameter = method.parameter("test").expect("test");
    assert_eq!(
        parameter.to_string(),
        format!("{}::methodWithOneParameter($test)", PARAMETER_TEST)
    );
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

#[test]
fn test_annotation_from_method_with_ignore() {
    let reflection = class(ANNOTATION_TEST)
        .with_config(ReflectionConfig::new().with_ignore(["return"]));
    let method = reflection.method("testFromReflectionMethod").expect("method");
    let names: Vec<&str> = method.annotations().expect("annotations").names().collect();
    assert_eq!(names, vec!["FirstTest"]);
    assert_eq!(method.annotations_to_ignore(), ["return".to_string()]);
}

#[test]
fn test_nested_class_annotations() {
    let reflection = class(ANNOTATION_TEST);
    let test = reflection.annotation("Test").expect("Test");
    assert_eq!(test.value("name").and_then(Value::as_str), Some("ReflectionAnnotationTest"));

    let outer = reflection.annotation("Outer").expect("Outer");
    let inner = outer.value(&0usize).and_then(Value::as_array).expect("inner list");
    let names: Vec<&str> = inner
        .annotations()
        .map(|a| {
            assert_eq!(a.name(), "Inner");
            a.value("name").and_then(Value::as_str).unwrap_or_default()
        })
        .collect();
    assert_eq!(names, vec!["Test", "AnotherTest"]);
}

#[test]
fn test_new_instance() {
    let registry = mock_registry();
    let reflection = class(ANNOTATION_TEST).with_config(mock_alias_config());
    let method = reflection.method("testNewInstance").expect("method");
    let annotation = method.annotation(MOCK_ANNOTATION).expect("aliased annotation");
    assert!(!method.has_annotation("MockAnnotation"));

    let instance = annotation
        .new_instance(&registry, [Value::Array(annotation.values().clone())])
        .expect("instance");
    let mock = instance.downcast::<MockAnnotation>().expect("mock");

    assert_eq!(mock.value("name").and_then(Value::as_str), Some("Test"));
    assert_eq!(mock.value("description").and_then(Value::as_str), Some("Another Test"));
    assert_eq!(
        mock.value("value").map(Value::to_json),
        Some(serde_json::json!({ "key": "a value" }))
    );
}

#[test]
fn test_new_instance_args() {
    let registry = mock_registry();
    let method = ReflectionMethod::new(ANNOTATION_TEST, "testNewInstanceArgs", fixture_source())
        .with_config(mock_alias_config());
    let annotation = method.annotation(MOCK_ANNOTATION).expect("annotation");
    let mock: MockAnnotation = registry
        .new_instance_of(annotation.name(), &[Value::Array(annotation.values().clone())])
        .expect("instance");
    assert_eq!(mock.values(), annotation.values());
}

#[test]
fn test_new_instance_args_without_args() {
    let registry = mock_registry();
    let method = ReflectionMethod::new(ANNOTATION_TEST, "testNewInstanceArgsWithoutArgs", fixture_source())
        .with_config(mock_alias_config());
    let annotation = method.annotation(MOCK_ANNOTATION).expect("annotation");
    assert!(annotation.values().is_empty());

    let instance = annotation.new_instance_args(&registry, &[]).expect("instance");
    let mock = instance.downcast::<MockAnnotation>().expect("mock");
    assert!(mock.values().is_empty());
}

#[test]
fn test_new_instance_unregistered() {
    let registry = mock_registry();
    let annotation = class(ANNOTATION_TEST)
        .annotation("Test")
        .expect("Test")
        .clone();
    assert!(annotation.new_instance_args(&registry, &[]).is_err());
}

#[test]
fn test_class_new_instance() {
    let registry = mock_registry();
    let instance = class(MOCK_ANNOTATION)
        .new_instance(&registry, Vec::new())
        .expect("instance");
    assert!(instance.downcast::<MockAnnotation>().is_ok());

    assert!(class(SERIALIZABLE).new_instance_args(&registry, &[]).is_err());
}

#[test]
fn test_alias_added_after_load() {
    let mut reflection = class(ANNOTATION_TEST);
    assert!(reflection.has_annotation("Test"));

    reflection.add_annotation_alias("App\\Annotation\\Test", "Test");
    assert!(reflection.has_annotation("App\\Annotation\\Test"));
    assert!(!reflection.has_annotation("Test"));
    assert_eq!(reflection.annotation_loads(), 2);

    let method = reflection.method("testFromReflectionMethod").expect("method");
    assert_eq!(
        method.annotation_aliases().get("App\\Annotation\\Test").map(String::as_str),
        Some("Test")
    );
}

// ============================================================================
// MEMOIZATION
// ============================================================================

#[test]
fn test_annotations_loaded_once() {
    let counting = Arc::new(CountingSource::new(fixture_source()));
    let reflection = ReflectionClass::new(CLASS_TEST, Arc::clone(&counting) as Arc<dyn TypeSource>);

    for _ in 0..5 {
        assert!(reflection.has_annotation("MockAnnotation"));
    }
    let first = reflection.annotations().expect("annotations") as *const _;
    let second = reflection.annotations().expect("annotations") as *const _;

    assert_eq!(first, second);
    assert_eq!(reflection.annotation_loads(), 1);
    assert_eq!(counting.lookups_of(CLASS_TEST), 1);
}

#[test]
fn test_members_loaded_once() {
    let counting = Arc::new(CountingSource::new(fixture_source()));
    let reflection = ReflectionClass::new(CLASS_TEST, Arc::clone(&counting) as Arc<dyn TypeSource>);

    reflection.methods(Modifiers::ALL).expect("methods");
    let after_first = counting.lookups();
    reflection.method("setUp").expect("setUp");
    reflection.has_method("testHasMethod");
    assert_eq!(counting.lookups(), after_first);
    assert_eq!(counting.lookups_of(TEST_CASE), 1);
}

#[test]
fn test_method_annotations_loaded_once() {
    let reflection = class(METHOD_TEST);
    let method = reflection.method("testGetAnnotation").expect("method");
    method.annotations().expect("first");
    method.has_annotation("MockAnnotation");
    method.annotation("return").expect("return");
    assert_eq!(method.annotation_loads(), 1);

    let again = reflection.method("testGetAnnotation").expect("method");
    assert!(Arc::ptr_eq(&method, &again));
    assert_eq!(again.annotation_loads(), 1);
}

#[test]
fn test_failed_load_is_retried() {
    let reflection = ReflectionClass::new("Late", Catalog::new().into_source());
    assert!(reflection.annotations().is_err());
    assert!(reflection.annotations().is_err());
    assert_eq!(reflection.annotation_loads(), 2);
}

#[test]
fn test_strict_config_propagates_parse_errors() {
    let source = Catalog::new()
        .with_class(
            ClassDescriptor::new("Broken")
                .with_doc("/** @Valid @Bad(name=, other) */")
                .with_method(MethodDescriptor::new("run").with_doc("/** @Bad(x=) */")),
        )
        .into_source();

    let lenient = ReflectionClass::new("Broken", Arc::clone(&source));
    assert!(lenient.has_annotation("Valid"));
    assert!(!lenient.has_annotation("Bad"));

    let strict = ReflectionClass::new("Broken", source)
        .with_config(ReflectionConfig::new().with_strict(true));
    assert!(matches!(strict.annotations(), Err(DocmetaError::Parse(_))));
    let method = strict.method("run").expect("method");
    assert!(matches!(method.annotations(), Err(DocmetaError::Parse(_))));
}

// ============================================================================
// MANIFEST
// ============================================================================

const MANIFEST: &str = r#"
[reflection]
ignore = ["return"]

[reflection.aliases]
"App\\Annotation\\Route" = "Route"

[[class]]
name = "App\\Controller\\Index"
doc = """
/**
 * @Route("/", name="index")
 */"""

[[class.method]]
name = "show"
doc = "/** @Route(\"/{id}\") @return string */"
parameters = [{ name = "id" }]
"#;

#[test]
fn test_manifest_catalog() {
    let (catalog, config) = Manifest::from_toml_str(MANIFEST).expect("manifest").into_parts();
    let reflection =
        ReflectionClass::new("App\\Controller\\Index", catalog.into_source()).with_config(config);

    let route = reflection.annotation("App\\Annotation\\Route").expect("route");
    assert_eq!(route.value(&0usize).and_then(Value::as_str), Some("/"));
    assert_eq!(route.value("name").and_then(Value::as_str), Some("index"));

    let show = reflection.method("show").expect("show");
    let names: Vec<&str> = show.annotations().expect("annotations").names().collect();
    assert_eq!(names, vec!["App\\Annotation\\Route"]);
    assert_eq!(show.parameter("id").expect("id").position(), Ok(0));
}
