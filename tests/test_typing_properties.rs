use pearl_sema::analysis::{minimal_fixed_width, rules, ExpressionTypeEngine, RuleParams, RuleViolation};
use pearl_sema::ast::{BinaryOp, LoopStmt, TreeBuilder, UnaryOp};
use pearl_sema::core::{BitPattern, ConstantPool, ConstantValue, SemanticType};
use pearl_sema::SymbolTable;
use proptest::prelude::*;

fn precision() -> impl Strategy<Value = u32> {
    1u32..=64
}

fn scalar_type() -> impl Strategy<Value = SemanticType> {
    prop_oneof![
        precision().prop_map(SemanticType::Fixed),
        precision().prop_map(SemanticType::Float),
        precision().prop_map(SemanticType::Bit),
        precision().prop_map(SemanticType::Char),
        Just(SemanticType::Duration),
        Just(SemanticType::Clock),
        Just(SemanticType::Task),
    ]
}

fn constant() -> impl Strategy<Value = ConstantValue> {
    prop_oneof![
        (any::<i64>(), precision()).prop_map(|(v, p)| ConstantValue::fixed(v, p)),
        (-1.0e6f64..1.0e6, precision()).prop_map(|(v, p)| ConstantValue::float(v, p)),
        prop::collection::vec(any::<bool>(), 1..12)
            .prop_map(|bits| ConstantValue::bits(bits.into_iter().collect::<BitPattern>())),
        "[A-Z]{0,6}".prop_map(ConstantValue::char),
        (0u64..100, 0u32..60, 0.0f64..60.0).prop_map(|(h, m, s)| ConstantValue::duration(h, m, s)),
    ]
}

proptest! {
    #[test]
    fn pool_insertion_is_idempotent(values in prop::collection::vec(constant(), 0..24)) {
        let mut pool = ConstantPool::seeded(31);
        let first: Vec<usize> = values.iter().cloned().map(|v| pool.add(v)).collect();
        let len = pool.len();
        let second: Vec<usize> = values.iter().cloned().map(|v| pool.add(v)).collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(pool.len(), len);
    }

    #[test]
    fn bit_ordinals_are_dense(values in prop::collection::vec(constant(), 0..24)) {
        let mut pool = ConstantPool::new();
        for value in values {
            pool.add(value);
        }
        let ordinals: Vec<u32> = pool.bit_strings().filter_map(ConstantValue::ordinal).collect();
        let expected: Vec<u32> = (1..=ordinals.len() as u32).collect();
        prop_assert_eq!(ordinals, expected);
    }

    #[test]
    fn additive_precision_is_max(g1 in precision(), g2 in precision()) {
        let params = RuleParams::default();
        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul] {
            prop_assert_eq!(
                rules::binary(op, &SemanticType::Fixed(g1), &SemanticType::Fixed(g2), params),
                Ok(SemanticType::Fixed(g1.max(g2)))
            );
            prop_assert_eq!(
                rules::binary(op, &SemanticType::Fixed(g1), &SemanticType::Float(g2), params),
                Ok(SemanticType::Float(g1.max(g2)))
            );
            prop_assert_eq!(
                rules::binary(op, &SemanticType::Float(g1), &SemanticType::Fixed(g2), params),
                Ok(SemanticType::Float(g1.max(g2)))
            );
        }
    }

    #[test]
    fn sign_is_single_bit_fixed(ty in scalar_type()) {
        match rules::unary(UnaryOp::Sign, &ty) {
            Ok(result) => {
                prop_assert!(matches!(
                    ty,
                    SemanticType::Fixed(_) | SemanticType::Float(_) | SemanticType::Duration
                ));
                prop_assert_eq!(result, SemanticType::Fixed(1));
            }
            Err(violation) => prop_assert_eq!(violation, RuleViolation::IllegalExpression),
        }
    }

    #[test]
    fn comparisons_yield_bit_or_illegal(lhs in scalar_type(), rhs in scalar_type()) {
        for op in [BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge, BinaryOp::Eq, BinaryOp::Ne] {
            match rules::binary(op, &lhs, &rhs, RuleParams::default()) {
                Ok(ty) => prop_assert_eq!(ty, SemanticType::Bit(1)),
                Err(violation) => prop_assert_eq!(violation, RuleViolation::IllegalExpression),
            }
        }
    }

    #[test]
    fn minimal_width_holds_value(value in any::<i64>()) {
        let width = minimal_fixed_width(value);
        let magnitude = i128::from(value).abs();
        let magnitude_bits = if value < 0 { width - 1 } else { width };
        prop_assert!(magnitude < (1i128 << magnitude_bits));
        if magnitude_bits > 1 {
            prop_assert!(magnitude >= (1i128 << (magnitude_bits - 1)));
        }
    }

    #[test]
    fn loop_bound_literals_use_minimal_width(value in 0i64..1_000_000, length in precision()) {
        let mut symbols = SymbolTable::default();
        let (_, module) = symbols.declare_module("m");
        symbols.set_default_lengths(module, Some(length), None);
        let (_, proc) = symbols.declare_procedure(module, "p", None);

        let mut b = TreeBuilder::new();
        let from = b.fixed(&value.to_string());
        let plain = b.fixed(&value.to_string());
        let body = b.expr_stmt(plain);
        let lp = b.loop_stmt(LoopStmt {
            from: Some(from),
            body: vec![body],
            ..LoopStmt::default()
        });
        let item = b.procedure("p", vec![lp]);
        b.module("m", vec![item]);
        let tree = b.finish();
        symbols.bind_statement_scope(lp, proc);

        let types = ExpressionTypeEngine::new(&symbols).analyze(&tree).unwrap();
        prop_assert_eq!(
            types.type_of(from),
            Some(&SemanticType::Fixed(minimal_fixed_width(value)))
        );
        prop_assert_eq!(types.type_of(plain), Some(&SemanticType::Fixed(length)));
    }
}
