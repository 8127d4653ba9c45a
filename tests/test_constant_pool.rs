use pearl_sema::analysis::ConstantPoolBuilder;
use pearl_sema::ast::{BinaryOp, StmtId, TreeBuilder, UnaryOp};
use pearl_sema::core::{ConstantPool, ConstantValue};
use pearl_sema::errors::ErrorKind;
use pearl_sema::{Config, Result, SyntaxTree, SymbolTable};

fn symbols(config: &Config) -> SymbolTable {
    let mut table = pearl_sema::symbol_table(config);
    let (_, module) = table.declare_module("m");
    table.declare_procedure(module, "p", None);
    table
}

fn unit(body: impl FnOnce(&mut TreeBuilder) -> Vec<StmtId>) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let stmts = body(&mut b);
    let item = b.procedure("p", stmts);
    b.module("m", vec![item]);
    b.finish()
}

fn build(tree: &SyntaxTree) -> Result<ConstantPool> {
    let table = symbols(&Config::default());
    ConstantPoolBuilder::new(&table).build(tree)
}

#[test]
fn test_seed_constants_not_duplicated() {
    let tree = unit(|b| {
        let zero = b.fixed("0");
        let one = b.fixed("1");
        let sum = b.binary(BinaryOp::Add, zero, one);
        vec![b.expr_stmt(sum)]
    });
    let pool = build(&tree).unwrap();
    assert_eq!(pool.len(), 3);
}

#[test]
fn test_seed_precision_from_config() {
    let config = Config::parse("[defaults]\nfixed_precision = 15\n").unwrap();
    let table = symbols(&config);
    let tree = unit(|_| Vec::new());
    let pool = ConstantPoolBuilder::new(&table).build(&tree).unwrap();
    assert_eq!(pool[2], ConstantValue::fixed(-1, 15));
}

#[test]
fn test_insertion_order_is_traversal_order() {
    let tree = unit(|b| {
        let s = b.string("HELLO");
        let t = b.clock("12", "30", "0");
        let u = b.float("0.25");
        vec![b.expr_stmt(s), b.expr_stmt(t), b.expr_stmt(u)]
    });
    let pool = build(&tree).unwrap();
    let kinds: Vec<&str> = pool.iter().skip(3).map(ConstantValue::variant_name).collect();
    assert_eq!(kinds, vec!["char", "clock", "float"]);
}

#[test]
fn test_temporal_constants_compare_by_seconds() {
    let tree = unit(|b| {
        let a = b.duration(Some("1"), None, None);
        let c = b.duration(None, Some("59"), Some("60"));
        let noon = b.clock("12", "0", "0");
        let also_noon = b.clock("36", "0", "0");
        vec![
            b.expr_stmt(a),
            b.expr_stmt(c),
            b.expr_stmt(noon),
            b.expr_stmt(also_noon),
        ]
    });
    let pool = build(&tree).unwrap();
    assert_eq!(pool.len(), 5);
    assert_eq!(pool[3], ConstantValue::duration(1, 0, 0.0));
    assert_eq!(pool[4], ConstantValue::clock(12, 0, 0.0));
}

#[test]
fn test_bit_strings_dedup_across_bases() {
    let tree = unit(|b| {
        let bin = b.bits("1010");
        let hex = b.bits_in_base("A", 4);
        let other = b.bits_in_base("7", 3);
        vec![b.expr_stmt(bin), b.expr_stmt(hex), b.expr_stmt(other)]
    });
    let pool = build(&tree).unwrap();
    let bits: Vec<&ConstantValue> = pool.bit_strings().collect();
    assert_eq!(bits.len(), 2);
    assert_eq!(bits[0].ordinal(), Some(1));
    assert_eq!(bits[1].ordinal(), Some(2));
}

#[test]
fn test_nested_negation_folds_innermost() {
    let tree = unit(|b| {
        let two = b.float("2.0");
        let neg = b.unary(UnaryOp::Minus, two);
        let abs = b.unary(UnaryOp::Abs, neg);
        vec![b.expr_stmt(abs)]
    });
    let pool = build(&tree).unwrap();
    assert!(pool.contains(&ConstantValue::float(-2.0, 24)));
    assert!(!pool.contains(&ConstantValue::float(2.0, 24)));
}

#[test]
fn test_negated_string_is_pooled_as_is() {
    let tree = unit(|b| {
        let s = b.string("X");
        let neg = b.unary(UnaryOp::Minus, s);
        vec![b.expr_stmt(neg)]
    });
    let pool = build(&tree).unwrap();
    assert!(pool.contains(&ConstantValue::char("X")));
}

#[test]
fn test_minutes_out_of_bounds() {
    let tree = unit(|b| {
        b.at(4, 9);
        let bad = b.duration(None, Some("60"), None);
        vec![b.expr_stmt(bad)]
    });
    let err = build(&tree).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValueOutOfBounds);
    assert_eq!((err.line(), err.col()), (4, 9));
}

#[test]
fn test_pool_json_export() {
    let tree = unit(|b| {
        let bits = b.bits("110");
        vec![b.expr_stmt(bits)]
    });
    let pool = build(&tree).unwrap();
    let json: serde_json::Value = serde_json::from_str(&pool.to_json().unwrap()).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["kind"], "fixed");
    assert_eq!(entries[3]["kind"], "bit");
    assert_eq!(entries[3]["bits"], "110");
    assert_eq!(entries[3]["ordinal"], 1);
}

#[test]
fn test_float_suffix_sets_precision() {
    let tree = unit(|b| {
        let x = b.float_with_precision("2.5", 53);
        let y = b.float("0.75");
        vec![b.expr_stmt(x), b.expr_stmt(y)]
    });
    let pool = build(&tree).unwrap();
    let precision_of = |value: f64| {
        let index = pool.position(&ConstantValue::float(value, 0))?;
        match &pool[index] {
            ConstantValue::Float { precision, .. } => Some(*precision),
            _ => None,
        }
    };
    assert_eq!(precision_of(2.5), Some(53));
    assert_eq!(precision_of(0.75), Some(24));
}
