//! Property-Based Tests for memoized reflection
//!
//! Properties:
//! - `has_annotation` agrees with the loaded annotation set
//! - Repeated access returns the same set and parses once
//! - Every generated annotation is readable through a reflected class
//! - Methods and properties inherit the class configuration

use docmeta_reflect::{ClassDescriptor, MethodDescriptor, Modifiers, PropertyDescriptor, ReflectionClass};
use docmeta_test_utils::generators::*;
use docmeta_test_utils::{Annotation, ReflectionConfig};
use proptest::prelude::*;

fn class_with(doc: String, config: ReflectionConfig) -> ReflectionClass {
    let descriptor = ClassDescriptor::new("App\\Generated")
        .with_doc(doc.clone())
        .with_method(MethodDescriptor::new("run").with_doc(doc.clone()))
        .with_property(PropertyDescriptor::new("state").with_modifiers(Modifiers::PRIVATE).with_doc(doc));
    ReflectionClass::from_descriptor(descriptor).with_config(config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_has_annotation_agrees_with_set(
        annotations in arb_annotations(4),
        candidate in arb_annotation_name(),
    ) {
        let reflection = class_with(render_doc_comment(&annotations), ReflectionConfig::new());
        let set = reflection.annotations().expect("annotations");

        for annotation in &annotations {
            prop_assert!(reflection.has_annotation(annotation.name()));
        }
        prop_assert_eq!(reflection.has_annotation(&candidate), set.contains(&candidate));
    }

    #[test]
    fn prop_annotations_load_once(annotations in arb_annotations(4), reads in 1usize..8) {
        let reflection = class_with(render_doc_comment(&annotations), ReflectionConfig::new());
        let first = reflection.annotations().expect("annotations").clone();

        for _ in 0..reads {
            prop_assert_eq!(reflection.annotations().expect("annotations"), &first);
        }
        prop_assert_eq!(reflection.annotation_loads(), 1);
    }

    #[test]
    fn prop_generated_annotations_round_trip(annotations in arb_annotations(4)) {
        let reflection = class_with(render_doc_comment(&annotations), ReflectionConfig::new());

        for expected in &annotations {
            let actual: &Annotation = reflection.annotation(expected.name()).expect("annotation");
            prop_assert_eq!(actual, expected);
        }
        prop_assert_eq!(reflection.annotations().expect("annotations").len(), annotations.len());
    }

    #[test]
    fn prop_members_inherit_config(annotations in arb_annotations(4), skip in 0usize..4) {
        let ignored: Vec<String> = annotations
            .iter()
            .take(skip)
            .map(|a| a.name().to_string())
            .collect();
        let config = ReflectionConfig::new().with_ignore(ignored.clone());
        let reflection = class_with(render_doc_comment(&annotations), config.clone());

        let method = reflection.method("run").expect("method");
        let property = reflection.property("state").expect("property");
        prop_assert_eq!(method.config(), &config);
        prop_assert_eq!(property.config(), &config);

        let expected = annotations.len() - ignored.len();
        prop_assert_eq!(method.annotations().expect("method").len(), expected);
        prop_assert_eq!(property.annotations().expect("property").len(), expected);
        for name in &ignored {
            prop_assert!(!method.has_annotation(name));
            prop_assert!(!property.has_annotation(name));
        }
    }
}
