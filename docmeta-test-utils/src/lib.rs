//! Docmeta Test Utilities
//!
//! Centralized test infrastructure for the docmeta workspace:
//! - A fixture catalog reproducing the reference test classes
//! - `MockAnnotation` and a registry that can construct and invoke it
//! - A type source that counts lookups
//! - Proptest generators for values, annotations and doc comments

// Re-export core types for convenience
pub use docmeta_core::{
    Annotation, AnnotationSet, ConstructionError, DocmetaError, DocmetaResult, Key, ParseError,
    ReflectionConfig, ReflectionError, Registry, Value, Values,
};
pub use docmeta_reflect::{
    Catalog, ClassDescriptor, ClassKind, MethodDescriptor, Modifiers, PropertyDescriptor,
    ReflectionClass, ReflectionMethod, ReflectionParameter, ReflectionProperty, TypeSource,
};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

// ============================================================================
// MOCK ANNOTATION
// ============================================================================

/// Name the mock annotation type is registered under.
pub const MOCK_ANNOTATION: &str = "AppserverIo\\Lang\\Reflection\\MockAnnotation";

/// Annotation type that keeps the values it was constructed with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockAnnotation {
    values: Values,
}

impl MockAnnotation {
    pub fn new(values: Values) -> Self {
        Self { values }
    }

    /// Construct from factory arguments: nothing, `null`, or one array of
    /// values.
    pub fn from_args(args: &[Value]) -> Result<Self, ConstructionError> {
        match args {
            [] | [Value::Null] => Ok(Self::default()),
            [Value::Array(values)] => Ok(Self::new(values.clone())),
            [other] => Err(ConstructionError::InvalidArguments {
                name: MOCK_ANNOTATION.to_string(),
                reason: format!("expected an array of values, got {}", other.type_name()),
            }),
            _ => Err(ConstructionError::InvalidArguments {
                name: MOCK_ANNOTATION.to_string(),
                reason: format!("expected at most one argument, got {}", args.len()),
            }),
        }
    }

    /// The value for `key`, or `None` when missing or `null`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn values(&self) -> &Values {
        &self.values
    }
}

/// Registry that constructs [`MockAnnotation`] under [`MOCK_ANNOTATION`]
/// and under the bare name `MockAnnotation`, and handles its `getValue`
/// method.
pub fn mock_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(MOCK_ANNOTATION, MockAnnotation::from_args)
        .register("MockAnnotation", MockAnnotation::from_args)
        .register_method(MOCK_ANNOTATION, "getValue", |mock: &MockAnnotation, args: &[Value]| {
            let key = args.first().and_then(Value::as_str).ok_or_else(|| {
                ConstructionError::InvalidArguments {
                    name: "getValue".to_string(),
                    reason: "expected a string key".to_string(),
                }
            })?;
            Ok(mock.value(key).cloned().unwrap_or(Value::Null))
        });
    registry
}

// ============================================================================
// COUNTING SOURCE
// ============================================================================

/// Type source wrapper that records every lookup.
#[derive(Debug)]
pub struct CountingSource {
    inner: Arc<dyn TypeSource>,
    lookups: RwLock<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new(inner: Arc<dyn TypeSource>) -> Self {
        Self {
            inner,
            lookups: RwLock::new(HashMap::new()),
        }
    }

    /// Total lookups across all names.
    pub fn lookups(&self) -> usize {
        let lookups = self.lookups.read().unwrap_or_else(PoisonError::into_inner);
        lookups.values().sum()
    }

    pub fn lookups_of(&self, name: &str) -> usize {
        let lookups = self.lookups.read().unwrap_or_else(PoisonError::into_inner);
        lookups.get(name).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.lookups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl TypeSource for CountingSource {
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        *self
            .lookups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert(0) += 1;
        self.inner.class(name)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Classes mirroring the reference reflection test suite.

    use super::*;

    pub const TEST_CASE: &str = "PHPUnit_Framework_TestCase";
    pub const OBJECT: &str = "AppserverIo\\Lang\\Objct";
    pub const OBJECT_INTERFACE: &str = "AppserverIo\\Lang\\ObjectInterface";
    pub const SERIALIZABLE: &str = "Serializable";
    pub const CLASS_TEST: &str = "AppserverIo\\Lang\\Reflection\\ReflectionClassTest";
    pub const METHOD_TEST: &str = "AppserverIo\\Lang\\Reflection\\ReflectionMethodTest";
    pub const PROPERTY_TEST: &str = "AppserverIo\\Lang\\Reflection\\ReflectionPropertyTest";
    pub const PARAMETER_TEST: &str = "AppserverIo\\Lang\\Reflection\\ReflectionParameterTest";
    pub const ANNOTATION_TEST: &str = "AppserverIo\\Lang\\Reflection\\ReflectionAnnotationTest";

    const AUTHOR_BLOCK: &str = r#" * @author    Tim Wagner <tw@appserver.io>
 * @copyright 2015 TechDivision GmbH <info@appserver.io>
 * @license   http://opensource.org/licenses/osl-3.0.php Open Software License (OSL 3.0)
 * @link      https://github.com/appserver-io/lang"#;

    const MOCK_VALUES: &str =
        r#"@MockAnnotation(name=MockAnnotation, description="some description", value="a value")"#;

    const MOCK_MAP_VALUES: &str =
        r#"@MockAnnotation(name=Test, description="Another Test", value={ "key" : "a value" })"#;

    const SET_UP_DOC: &str = r#"/**
     * Initializes the instance before we run each test.
     *
     * @return void
     * @see PHPUnit_Framework_TestCase::setUp()
     */"#;

    fn class_doc(summary: &str, annotations: &[&str]) -> String {
        let mut doc = format!("/**\n * {}\n *\n{}\n", summary, AUTHOR_BLOCK);
        for annotation in annotations {
            doc.push_str(" * ");
            doc.push_str(annotation);
            doc.push('\n');
        }
        doc.push_str(" */");
        doc
    }

    fn method_doc(summary: &str, annotations: &[&str]) -> String {
        let mut doc = format!("/**\n     * {}\n     *\n", summary);
        for annotation in annotations {
            doc.push_str("     * ");
            doc.push_str(annotation);
            doc.push('\n');
        }
        doc.push_str("     */");
        doc
    }

    fn public(name: &str, doc: String) -> MethodDescriptor {
        MethodDescriptor::new(name).with_doc(doc)
    }

    fn test_method(name: &str) -> MethodDescriptor {
        public(name, method_doc("A test.", &["@return void"]))
    }

    fn set_up() -> MethodDescriptor {
        MethodDescriptor::new("setUp")
            .with_modifiers(Modifiers::PROTECTED)
            .with_doc(SET_UP_DOC)
    }

    pub fn test_case() -> ClassDescriptor {
        ClassDescriptor::new(TEST_CASE)
            .with_kind(ClassKind::Abstract)
            .with_method(
                MethodDescriptor::new("setUp")
                    .with_modifiers(Modifiers::PROTECTED)
                    .with_doc(method_doc("Sets up the fixture.", &["@return void"])),
            )
            .with_method(
                MethodDescriptor::new("assertTrue")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .with_parameter("condition")
                    .with_parameter("message"),
            )
            .with_property(
                PropertyDescriptor::new("backupGlobals").with_modifiers(Modifiers::PROTECTED),
            )
    }

    pub fn serializable() -> ClassDescriptor {
        ClassDescriptor::new(SERIALIZABLE)
            .with_kind(ClassKind::Interface)
            .with_method(MethodDescriptor::new("serialize").with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT))
            .with_method(
                MethodDescriptor::new("unserialize")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
                    .with_parameter("serialized"),
            )
    }

    pub fn object_interface() -> ClassDescriptor {
        ClassDescriptor::new(OBJECT_INTERFACE)
            .with_kind(ClassKind::Interface)
            .with_interface(SERIALIZABLE)
    }

    pub fn object() -> ClassDescriptor {
        ClassDescriptor::new(OBJECT)
            .with_kind(ClassKind::Abstract)
            .with_interface(OBJECT_INTERFACE)
            .with_method(MethodDescriptor::new("serialize"))
            .with_method(MethodDescriptor::new("unserialize").with_parameter("serialized"))
    }

    pub fn mock_annotation() -> ClassDescriptor {
        ClassDescriptor::new(MOCK_ANNOTATION)
            .with_parent(OBJECT)
            .with_doc(class_doc("Mock annotation implementation.", &[]))
            .with_method(
                MethodDescriptor::new("__construct")
                    .with_doc(method_doc(
                        "Initializes the mock instance with dummy args.",
                        &["@param array $values The args to pass to the instance"],
                    ))
                    .with_parameter("values"),
            )
            .with_method(
                MethodDescriptor::new("getValue")
                    .with_doc(method_doc(
                        "Returns the requested value if available.",
                        &[
                            "@param string $key The key of the value to return",
                            "@return mixed The requested value",
                        ],
                    ))
                    .with_parameter("key"),
            )
            .with_property(PropertyDescriptor::new("values").with_modifiers(Modifiers::PROTECTED))
    }

    pub fn class_test() -> ClassDescriptor {
        ClassDescriptor::new(CLASS_TEST)
            .with_parent(TEST_CASE)
            .with_doc(class_doc("This is the test for the ReflectionClass class.", &[MOCK_VALUES]))
            .with_property(
                PropertyDescriptor::new("reflectionClass")
                    .with_modifiers(Modifiers::PROTECTED)
                    .with_doc(method_doc(
                        "The reflection class intance we want to test.",
                        &["@var \\AppserverIo\\Lang\\Reflection\\ReflectionClass"],
                    )),
            )
            .with_method(set_up())
            .with_method(test_method("testGetClassName"))
            .with_method(test_method("testHasMethodWithExistingMethod"))
            .with_method(test_method("testGetMethodWithExistingMethod"))
            .with_method(public(
                "testGetMethodWithException",
                method_doc(
                    "Test if this method is available in the reflection method list.",
                    &["@return void @expectedException AppserverIo\\Lang\\Reflection\\ReflectionException"],
                ),
            ))
            .with_method(test_method("testHasMethod"))
            .with_method(test_method("testHasProperty"))
    }

    pub fn method_test() -> ClassDescriptor {
        ClassDescriptor::new(METHOD_TEST)
            .with_parent(TEST_CASE)
            .with_doc(class_doc(
                "This is the test for the ReflectionMethod class.",
                &["@category   Library", "@package    Lang", "@subpackage Reflection"],
            ))
            .with_method(set_up())
            .with_method(public(
                "testGetAnnotation",
                method_doc(
                    "Test if the class annotation is available and has the correct values set.",
                    &["@return void", MOCK_VALUES],
                ),
            ))
            .with_method(public(
                "testGetAnnotationWithException",
                method_doc(
                    "Test if an execption is thrown if a requested annotation is not available.",
                    &[
                        "@return void",
                        "@expectedException AppserverIo\\Lang\\Reflection\\ReflectionException",
                    ],
                ),
            ))
            .with_method(test_method("testInvokeWithArgs"))
            .with_method(
                public(
                    "methodWithTwoParameters",
                    method_doc(
                        "A method with two parameters, used for testing purposes.",
                        &[
                            "@param string $test0 First test parameter",
                            "@param string $test1 Second test parameter",
                            "@return void",
                        ],
                    ),
                )
                .with_parameter("test0")
                .with_parameter("test1"),
            )
    }

    pub fn property_test() -> ClassDescriptor {
        ClassDescriptor::new(PROPERTY_TEST)
            .with_parent(TEST_CASE)
            .with_doc(class_doc("This is the test for the ReflectionProperty class.", &[]))
            .with_property(
                PropertyDescriptor::new("reflectionProperty")
                    .with_modifiers(Modifiers::PROTECTED)
                    .with_doc(method_doc(
                        "The reflection property instance we want to test.",
                        &["@var \\AppserverIo\\Lang\\Reflection\\ReflectionProperty", MOCK_VALUES],
                    )),
            )
            .with_property(
                PropertyDescriptor::new("undocumented").with_modifiers(Modifiers::PRIVATE),
            )
            .with_method(set_up())
    }

    pub fn parameter_test() -> ClassDescriptor {
        ClassDescriptor::new(PARAMETER_TEST)
            .with_parent(TEST_CASE)
            .with_method(
                public(
                    "methodWithOneParameter",
                    method_doc(
                        "A method with one parameter, used for testing purposes.",
                        &["@param string $test A test parameter", "@return void"],
                    ),
                )
                .with_parameter("test"),
            )
            .with_method(
                public(
                    "methodWithTwoParameters",
                    method_doc(
                        "A method with two parameters, used for testing purposes.",
                        &[
                            "@param string $test0 First test parameter",
                            "@param string $test1 Second test parameter",
                            "@return void",
                        ],
                    ),
                )
                .with_parameter("test0")
                .with_parameter("test1"),
            )
    }

    pub fn annotation_test() -> ClassDescriptor {
        ClassDescriptor::new(ANNOTATION_TEST)
            .with_parent(TEST_CASE)
            .with_doc(class_doc(
                "This is the test for the ReflectionAnnotation class.",
                &[
                    "@Test(name=ReflectionAnnotationTest)",
                    "@Outer({",
                    "    @Inner(name=\"Test\"),",
                    "    @Inner(name=\"AnotherTest\")",
                    "})",
                ],
            ))
            .with_method(set_up())
            .with_method(public(
                "testFromReflectionMethod",
                method_doc(
                    "This test checks if the annotations passed from this instance will be initialized correctly.",
                    &["@return void", "@FirstTest"],
                ),
            ))
            .with_method(public(
                "testNewInstance",
                method_doc(
                    "This test checks if the annotations newInstance() method works as expected.",
                    &["@return void", MOCK_MAP_VALUES],
                ),
            ))
            .with_method(public(
                "testNewInstanceArgs",
                method_doc(
                    "This test checks if the annotations newInstanceArgs() method works as expected.",
                    &["@return void", MOCK_MAP_VALUES],
                ),
            ))
            .with_method(public(
                "testNewInstanceArgsWithoutArgs",
                method_doc(
                    "This test checks if the annotations newInstanceArgs() method works as expected.",
                    &["@return void", "@MockAnnotation"],
                ),
            ))
    }

    /// Every fixture class.
    pub fn fixture_catalog() -> Catalog {
        [
            test_case(),
            serializable(),
            object_interface(),
            object(),
            mock_annotation(),
            class_test(),
            method_test(),
            property_test(),
            parameter_test(),
            annotation_test(),
        ]
        .into_iter()
        .collect()
    }

    pub fn fixture_source() -> Arc<dyn TypeSource> {
        fixture_catalog().into_source()
    }

    /// Alias config used by the instantiation tests: `@MockAnnotation`
    /// resolves to [`MOCK_ANNOTATION`].
    pub fn mock_alias_config() -> ReflectionConfig {
        ReflectionConfig::new().with_alias(MOCK_ANNOTATION, "MockAnnotation")
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for annotation data and doc comments.

    use super::*;
    use proptest::prelude::*;

    /// Annotation names: an uppercase start, no keywords.
    pub fn arb_annotation_name() -> impl Strategy<Value = String> {
        "[A-Z][a-zA-Z0-9_]{0,12}"
    }

    pub fn arb_param_name() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9_]{0,8}".prop_filter("keywords are not names", |s| {
            !matches!(s.to_lowercase().as_str(), "true" | "false" | "null")
        })
    }

    /// Scalars and strings that render and lex back unchanged.
    pub fn arb_scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            (-1_000_000i64..1_000_000).prop_map(Value::Integer),
            any::<bool>().prop_map(Value::Bool),
            "[a-zA-Z0-9 ./:-]{0,16}".prop_map(Value::String),
        ]
    }

    pub fn arb_annotation() -> impl Strategy<Value = Annotation> {
        (
            arb_annotation_name(),
            prop::collection::btree_map(arb_param_name(), arb_scalar_value(), 0..4),
        )
            .prop_map(|(name, params)| {
                let values: Values = params.into_iter().collect();
                Annotation::new(name, &values)
            })
    }

    /// Annotations with distinct names.
    pub fn arb_annotations(max: usize) -> impl Strategy<Value = Vec<Annotation>> {
        prop::collection::vec(arb_annotation(), 0..=max).prop_map(|annotations| {
            let set: AnnotationSet = annotations.into_iter().collect();
            set.into_iter().collect()
        })
    }

    pub fn arb_config() -> impl Strategy<Value = ReflectionConfig> {
        (
            prop::collection::vec(arb_annotation_name(), 0..3),
            prop::collection::btree_map(arb_annotation_name(), "[A-Z][a-z]{0,4}", 0..3),
            any::<bool>(),
        )
            .prop_map(|(ignore, aliases, strict)| ReflectionConfig {
                ignore,
                aliases,
                strict,
            })
    }

    /// Render an annotation built from scalar values as doc-comment source.
    pub fn render_annotation(annotation: &Annotation) -> String {
        if annotation.values().is_empty() {
            return format!("@{}", annotation.name());
        }
        let args: Vec<String> = annotation
            .values()
            .iter()
            .map(|(key, value)| {
                let literal = match value {
                    Value::String(s) => format!("\"{}\"", s),
                    Value::Integer(i) => i.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Float(f) => format!("{:?}", f),
                    _ => "null".to_string(),
                };
                match key {
                    Key::Name(name) => format!("{}={}", name, literal),
                    Key::Index(_) => literal,
                }
            })
            .collect();
        format!("@{}({})", annotation.name(), args.join(", "))
    }

    /// A doc comment holding `annotations`, one per line, after free text.
    pub fn render_doc_comment(annotations: &[Annotation]) -> String {
        let mut doc = String::from("/**\n * Generated description.\n *\n");
        for annotation in annotations {
            doc.push_str(" * ");
            doc.push_str(&render_annotation(annotation));
            doc.push('\n');
        }
        doc.push_str(" */");
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_mock_annotation_from_args() {
        let values: Values = [("name", Value::from("Test"))].into_iter().collect();
        let mock = MockAnnotation::from_args(&[Value::Array(values)]).expect("construct");
        assert_eq!(mock.value("name").and_then(Value::as_str), Some("Test"));
        assert!(mock.value("description").is_none());

        assert_eq!(MockAnnotation::from_args(&[]), Ok(MockAnnotation::default()));
        assert!(MockAnnotation::from_args(&[Value::from(1i64)]).is_err());
    }

    #[test]
    fn test_mock_registry_invoke() {
        let registry = mock_registry();
        let values: Values = [("test", Value::from("aValue"))].into_iter().collect();
        let mock: MockAnnotation = registry
            .new_instance_of(MOCK_ANNOTATION, &[Value::Array(values)])
            .expect("instance");
        let result = registry
            .invoke_args(MOCK_ANNOTATION, "getValue", &mock, &[Value::from("test")])
            .expect("invoke");
        assert_eq!(result, Value::from("aValue"));
    }

    #[test]
    fn test_counting_source() {
        let counting = CountingSource::new(fixture_source());
        assert!(counting.class(CLASS_TEST).is_some());
        assert!(counting.class("Missing").is_none());
        assert_eq!(counting.lookups(), 2);
        assert_eq!(counting.lookups_of(CLASS_TEST), 1);
        counting.reset();
        assert_eq!(counting.lookups(), 0);
    }

    #[test]
    fn test_fixture_catalog_complete() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.len(), 10);
        for name in [CLASS_TEST, METHOD_TEST, PROPERTY_TEST, PARAMETER_TEST, ANNOTATION_TEST] {
            let class = catalog.class(name).expect("fixture class");
            assert_eq!(class.parent.as_deref(), Some(TEST_CASE));
        }
    }
}
