//! Property tests for the pure pipeline stages.

use dyneval::build::{sanitize_name, source_digest};
use dyneval::{Evaluation, Var};
use proptest::prelude::*;

proptest! {
    #[test]
    fn sanitize_emits_only_identifier_characters(name in ".{0,60}") {
        let sanitized = sanitize_name(&name);
        prop_assert!(sanitized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
        prop_assert!(!sanitized.contains("__"));
    }

    #[test]
    fn sanitize_preserves_alphanumeric_words(name in "[a-z0-9 .]{0,40}") {
        let sanitized = sanitize_name(&name);
        for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
            if !word.is_empty() {
                prop_assert!(sanitized.contains(word));
            }
        }
    }

    #[test]
    fn generation_is_insensitive_to_registration_order(
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        imports_reversed in any::<bool>(),
    ) {
        let declarations = [
            Var::new("A", "int"),
            Var::with_default("B", "float64", 10.5),
            Var::with_default("Greeting", "string", "hi"),
            Var::with_default("Flag", "bool", true),
        ];
        let imports = ["std::fmt", "std::collections::BTreeMap"];

        let mut reference = Evaluation::with_name("ordering");
        for var in &declarations {
            reference.define_variable(var.clone());
        }
        for import in imports {
            reference.import(import);
        }
        reference.prepare("Value::from(A)");

        let mut shuffled = Evaluation::with_name("ordering");
        for &i in &order {
            shuffled.define_variable(declarations[i].clone());
        }
        if imports_reversed {
            for import in imports.iter().rev() {
                shuffled.import(*import);
            }
        } else {
            for import in imports {
                shuffled.import(import);
            }
        }
        shuffled.prepare("Value::from(A)");

        let a = reference.generate().unwrap();
        let b = shuffled.generate().unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(source_digest(&a), source_digest(&b));
    }

    #[test]
    fn distinct_bodies_never_collide_on_digest(
        body_a in "[a-z]{1,12}",
        body_b in "[a-z]{1,12}",
    ) {
        prop_assume!(body_a != body_b);

        let mut unit_a = Evaluation::with_name("digest");
        unit_a.prepare(&body_a);
        let mut unit_b = Evaluation::with_name("digest");
        unit_b.prepare(&body_b);

        prop_assert_ne!(
            source_digest(&unit_a.generate().unwrap()),
            source_digest(&unit_b.generate().unwrap())
        );
    }
}
