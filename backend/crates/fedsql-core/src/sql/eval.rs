//! Expression evaluation over in-memory rows.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Utc;
use fedsql_commons::Value;
use fedsql_sql::ddl::show::like_matches;
use fedsql_sql::parser::object_name_parts;
use sqlparser::ast::{
    BinaryOperator, DuplicateTreatment, Expr, Function, FunctionArg, FunctionArgExpr,
    FunctionArguments, Ident, SelectItem, UnaryOperator, Value as SqlValue,
};

use super::variables;
use crate::error::{GatewayError, GatewayResult};

const AGGREGATES: &[&str] = &["count", "sum", "avg", "min", "max"];

/// A column of the relation being evaluated, with the names that may
/// qualify it (table alias and table name, lowercased).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    pub qualifiers: Vec<String>,
    pub name: String,
}

impl BoundColumn {
    pub fn new(name: impl Into<String>, qualifiers: &[String]) -> Self {
        Self {
            qualifiers: qualifiers.iter().map(|q| q.to_lowercase()).collect(),
            name: name.into(),
        }
    }

    fn matches(&self, qualifier: Option<&str>, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            && qualifier
                .map(|q| self.qualifiers.iter().any(|c| c.eq_ignore_ascii_case(q)))
                .unwrap_or(true)
    }
}

/// What an expression can see: the current row and, when aggregating, the
/// rows of the group.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub columns: &'a [BoundColumn],
    pub row: Option<&'a [Value]>,
    pub group: Option<&'a [Vec<Value>]>,
}

impl<'a> Scope<'a> {
    /// No columns at all, as in `SELECT 1`.
    pub fn empty() -> Scope<'static> {
        Scope {
            columns: &[],
            row: Some(&[]),
            group: None,
        }
    }

    pub fn row(columns: &'a [BoundColumn], row: &'a [Value]) -> Self {
        Self {
            columns,
            row: Some(row),
            group: None,
        }
    }

    pub fn group(columns: &'a [BoundColumn], rows: &'a [Vec<Value>]) -> Self {
        Self {
            columns,
            row: rows.first().map(|r| r.as_slice()),
            group: Some(rows),
        }
    }
}

/// Session facts visible to functions such as `database()`.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    pub database: &'a str,
    pub connection_id: u64,
}

impl<'a> Evaluator<'a> {
    pub fn new(database: &'a str, connection_id: u64) -> Self {
        Self {
            database,
            connection_id,
        }
    }

    pub fn eval(&self, expr: &Expr, scope: &Scope<'_>) -> GatewayResult<Value> {
        match expr {
            Expr::Value(v) => Ok(literal(&v.value)),
            Expr::Identifier(ident) => self.identifier(ident, scope),
            Expr::CompoundIdentifier(parts) => {
                if parts.first().map(|p| p.value.starts_with("@@")).unwrap_or(false) {
                    let name: Vec<&str> = parts.iter().map(|p| p.value.as_str()).collect();
                    return Ok(variables::lookup(&name.join(".")).unwrap_or(Value::Null));
                }
                let name = parts.last().map(|p| p.value.as_str()).unwrap_or_default();
                let qualifier = parts.len().checked_sub(2).map(|i| parts[i].value.as_str());
                lookup(scope, qualifier, name)
            }
            Expr::Nested(inner) => self.eval(inner, scope),
            Expr::UnaryOp { op, expr } => {
                let value = self.eval(expr, scope)?;
                match op {
                    UnaryOperator::Not => Ok(value.truthiness().map(|b| Value::Bool(!b)).unwrap_or(Value::Null)),
                    UnaryOperator::Minus => match value {
                        Value::Null => Ok(Value::Null),
                        Value::Int(i) => Ok(i.checked_neg().map(Value::Int).unwrap_or(Value::Float(-(i as f64)))),
                        other => other
                            .as_f64()
                            .map(|f| Value::Float(-f))
                            .ok_or_else(|| type_error("-", &other)),
                    },
                    UnaryOperator::Plus => Ok(value),
                    other => Err(GatewayError::NotSupported(format!("operator {}", other))),
                }
            }
            Expr::BinaryOp { left, op, right } => self.binary(left, op, right, scope),
            Expr::IsNull(inner) => Ok(Value::Bool(self.eval(inner, scope)?.is_null())),
            Expr::IsNotNull(inner) => Ok(Value::Bool(!self.eval(inner, scope)?.is_null())),
            Expr::IsTrue(inner) => Ok(Value::Bool(self.eval(inner, scope)?.truthiness() == Some(true))),
            Expr::IsFalse(inner) => Ok(Value::Bool(self.eval(inner, scope)?.truthiness() == Some(false))),
            Expr::InList { expr, list, negated } => {
                let needle = self.eval(expr, scope)?;
                if needle.is_null() {
                    return Ok(Value::Null);
                }
                let mut saw_null = false;
                for item in list {
                    match needle.sql_eq(&self.eval(item, scope)?) {
                        Some(true) => return Ok(Value::Bool(!negated)),
                        Some(false) => {}
                        None => saw_null = true,
                    }
                }
                Ok(if saw_null { Value::Null } else { Value::Bool(*negated) })
            }
            Expr::Between { expr, negated, low, high } => {
                let value = self.eval(expr, scope)?;
                let low = self.eval(low, scope)?;
                let high = self.eval(high, scope)?;
                match (value.sql_cmp(&low), value.sql_cmp(&high)) {
                    (Some(l), Some(h)) => {
                        let inside = l != Ordering::Less && h != Ordering::Greater;
                        Ok(Value::Bool(inside != *negated))
                    }
                    _ => Ok(Value::Null),
                }
            }
            Expr::Like { negated, expr, pattern, .. } | Expr::ILike { negated, expr, pattern, .. } => {
                let value = self.eval(expr, scope)?;
                let pattern = self.eval(pattern, scope)?;
                if value.is_null() || pattern.is_null() {
                    return Ok(Value::Null);
                }
                Ok(Value::Bool(like_matches(&pattern.render(), &value.render()) != *negated))
            }
            Expr::Cast { expr, data_type, .. } => {
                let value = self.eval(expr, scope)?;
                Ok(cast(value, &data_type.to_string()))
            }
            Expr::Function(function) => self.function(function, scope),
            other => Err(GatewayError::NotSupported(format!("expression {}", other))),
        }
    }

    /// Filter helper: only a definite `true` keeps the row.
    pub fn is_true(&self, expr: &Expr, scope: &Scope<'_>) -> GatewayResult<bool> {
        Ok(self.eval(expr, scope)?.truthiness() == Some(true))
    }

    fn identifier(&self, ident: &Ident, scope: &Scope<'_>) -> GatewayResult<Value> {
        if ident.value.starts_with("@@") {
            return Ok(variables::lookup(&ident.value).unwrap_or(Value::Null));
        }
        match lookup(scope, None, &ident.value) {
            // The generic dialect reads "a" as an identifier; MySQL clients mean a string.
            Err(GatewayError::UnknownColumn(_)) if ident.quote_style == Some('"') => {
                Ok(Value::Text(ident.value.clone()))
            }
            other => other,
        }
    }

    fn binary(&self, left: &Expr, op: &BinaryOperator, right: &Expr, scope: &Scope<'_>) -> GatewayResult<Value> {
        match op {
            BinaryOperator::And => {
                let l = self.eval(left, scope)?.truthiness();
                if l == Some(false) {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval(right, scope)?.truthiness();
                Ok(match (l, r) {
                    (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                })
            }
            BinaryOperator::Or => {
                let l = self.eval(left, scope)?.truthiness();
                if l == Some(true) {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval(right, scope)?.truthiness();
                Ok(match (l, r) {
                    (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                })
            }
            _ => {
                let l = self.eval(left, scope)?;
                let r = self.eval(right, scope)?;
                apply_binary(op, l, r)
            }
        }
    }

    fn function(&self, function: &Function, scope: &Scope<'_>) -> GatewayResult<Value> {
        let name = function_name(function);
        if AGGREGATES.contains(&name.as_str()) {
            return self.aggregate(&name, function, scope);
        }

        let args = self.eval_args(function, scope)?;
        let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Null);
        let value = match name.as_str() {
            "database" | "schema" => Value::from(self.database),
            "version" => Value::from(variables::SERVER_VERSION),
            "connection_id" => Value::Int(self.connection_id as i64),
            "user" | "current_user" | "session_user" | "system_user" => Value::from("fedsql@localhost"),
            "now" | "current_timestamp" | "sysdate" => {
                Value::Text(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())
            }
            "lower" | "lcase" => map_text(arg(0), |s| s.to_lowercase()),
            "upper" | "ucase" => map_text(arg(0), |s| s.to_uppercase()),
            "length" | "char_length" | "character_length" => match arg(0) {
                Value::Null => Value::Null,
                v if name == "length" => Value::Int(v.render().len() as i64),
                v => Value::Int(v.render().chars().count() as i64),
            },
            "abs" => match arg(0) {
                Value::Int(i) => Value::Int(i.saturating_abs()),
                Value::Null => Value::Null,
                v => v.as_f64().map(|f| Value::Float(f.abs())).ok_or_else(|| type_error("ABS", &v))?,
            },
            "round" => {
                let digits = arg(1).as_i64().unwrap_or(0);
                match arg(0) {
                    Value::Null => Value::Null,
                    Value::Int(i) if digits >= 0 => Value::Int(i),
                    v => {
                        let f = v.as_f64().ok_or_else(|| type_error("ROUND", &v))?;
                        let scale = 10f64.powi(digits as i32);
                        let rounded = (f * scale).round() / scale;
                        if digits <= 0 {
                            Value::Int(rounded as i64)
                        } else {
                            Value::Float(rounded)
                        }
                    }
                }
            }
            "coalesce" | "ifnull" => args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null),
            "concat" => {
                if args.iter().any(Value::is_null) {
                    Value::Null
                } else {
                    Value::Text(args.iter().map(Value::render).collect())
                }
            }
            other => return Err(GatewayError::NotSupported(format!("function {}()", other))),
        };
        Ok(value)
    }

    fn eval_args(&self, function: &Function, scope: &Scope<'_>) -> GatewayResult<Vec<Value>> {
        let FunctionArguments::List(list) = &function.args else {
            return Ok(Vec::new());
        };
        list.args
            .iter()
            .map(|arg| match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => self.eval(e, scope),
                other => Err(GatewayError::NotSupported(format!("function argument {}", other))),
            })
            .collect()
    }

    fn aggregate(&self, name: &str, function: &Function, scope: &Scope<'_>) -> GatewayResult<Value> {
        let rows = scope.group.ok_or_else(|| {
            GatewayError::Validation(format!("aggregate {}() is not allowed here", name.to_uppercase()))
        })?;
        let FunctionArguments::List(list) = &function.args else {
            return Err(GatewayError::InvalidSql(format!("{}() needs an argument", name.to_uppercase())));
        };
        let distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
        let arg = match list.args.as_slice() {
            [FunctionArg::Unnamed(FunctionArgExpr::Wildcard)] if name == "count" => None,
            [FunctionArg::Unnamed(FunctionArgExpr::Expr(e))] => Some(e),
            _ => {
                return Err(GatewayError::InvalidSql(format!(
                    "{}() takes exactly one argument",
                    name.to_uppercase()
                )))
            }
        };

        let Some(arg) = arg else {
            return Ok(Value::Int(rows.len() as i64));
        };

        let mut values = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();
        for row in rows {
            let value = self.eval(arg, &Scope::row(scope.columns, row))?;
            if value.is_null() {
                continue;
            }
            if distinct && !seen.insert(format!("{}:{}", value.type_name(), value.render())) {
                continue;
            }
            values.push(value);
        }

        Ok(match name {
            "count" => Value::Int(values.len() as i64),
            "sum" | "avg" => {
                if values.is_empty() {
                    return Ok(Value::Null);
                }
                if name == "sum" && values.iter().all(|v| matches!(v, Value::Int(_))) {
                    let total = values.iter().filter_map(Value::as_i64).fold(0i64, i64::saturating_add);
                    return Ok(Value::Int(total));
                }
                let total: f64 = values.iter().filter_map(Value::as_f64).sum();
                if name == "sum" {
                    Value::Float(total)
                } else {
                    Value::Float(total / values.len() as f64)
                }
            }
            "min" => extreme(values, Ordering::Less),
            _ => extreme(values, Ordering::Greater),
        })
    }
}

fn extreme(values: Vec<Value>, keep: Ordering) -> Value {
    values
        .into_iter()
        .reduce(|best, v| if v.sql_cmp(&best) == Some(keep) { v } else { best })
        .unwrap_or(Value::Null)
}

fn lookup(scope: &Scope<'_>, qualifier: Option<&str>, name: &str) -> GatewayResult<Value> {
    let position = scope.columns.iter().position(|c| c.matches(qualifier, name));
    match position {
        Some(i) => Ok(scope.row.and_then(|r| r.get(i)).cloned().unwrap_or(Value::Null)),
        None => Err(GatewayError::UnknownColumn(match qualifier {
            Some(q) => format!("{}.{}", q, name),
            None => name.to_string(),
        })),
    }
}

/// SQL literal to a cell value.
pub fn literal(value: &SqlValue) -> Value {
    match value {
        SqlValue::Number(n, _) => n
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| n.parse::<f64>().map(Value::Float))
            .unwrap_or_else(|_| Value::Text(n.clone())),
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => Value::Text(s.clone()),
        SqlValue::Boolean(b) => Value::Bool(*b),
        SqlValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

fn apply_binary(op: &BinaryOperator, l: Value, r: Value) -> GatewayResult<Value> {
    let cmp = |pred: fn(Ordering) -> bool| Ok(l.sql_cmp(&r).map(|o| Value::Bool(pred(o))).unwrap_or(Value::Null));
    match op {
        BinaryOperator::Eq => cmp(|o| o == Ordering::Equal),
        BinaryOperator::NotEq => cmp(|o| o != Ordering::Equal),
        BinaryOperator::Lt => cmp(|o| o == Ordering::Less),
        BinaryOperator::LtEq => cmp(|o| o != Ordering::Greater),
        BinaryOperator::Gt => cmp(|o| o == Ordering::Greater),
        BinaryOperator::GtEq => cmp(|o| o != Ordering::Less),
        BinaryOperator::Spaceship => Ok(Value::Bool(match (l.is_null(), r.is_null()) {
            (true, true) => true,
            (false, false) => l.sql_eq(&r) == Some(true),
            _ => false,
        })),
        BinaryOperator::StringConcat => {
            if l.is_null() || r.is_null() {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(format!("{}{}", l.render(), r.render())))
            }
        }
        BinaryOperator::Plus
        | BinaryOperator::Minus
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo => arithmetic(op, l, r),
        other => Err(GatewayError::NotSupported(format!("operator {}", other))),
    }
}

fn arithmetic(op: &BinaryOperator, l: Value, r: Value) -> GatewayResult<Value> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    if let (Value::Int(a), Value::Int(b)) = (&l, &r) {
        let (a, b) = (*a, *b);
        let exact = match op {
            BinaryOperator::Plus => a.checked_add(b),
            BinaryOperator::Minus => a.checked_sub(b),
            BinaryOperator::Multiply => a.checked_mul(b),
            BinaryOperator::Modulo if b == 0 => return Ok(Value::Null),
            BinaryOperator::Modulo => a.checked_rem(b),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Value::Int(v));
        }
    }
    let a = l.as_f64().ok_or_else(|| type_error(&op.to_string(), &l))?;
    let b = r.as_f64().ok_or_else(|| type_error(&op.to_string(), &r))?;
    Ok(match op {
        BinaryOperator::Plus => Value::Float(a + b),
        BinaryOperator::Minus => Value::Float(a - b),
        BinaryOperator::Multiply => Value::Float(a * b),
        BinaryOperator::Divide | BinaryOperator::Modulo if b == 0.0 => Value::Null,
        BinaryOperator::Divide => Value::Float(a / b),
        _ => Value::Float(a % b),
    })
}

fn cast(value: Value, data_type: &str) -> Value {
    if value.is_null() {
        return value;
    }
    let ty = data_type.to_uppercase();
    if ty.contains("INT") || ty.contains("SIGNED") {
        value.as_f64().map(|f| Value::Int(f.trunc() as i64)).unwrap_or(Value::Null)
    } else if ["FLOAT", "DOUBLE", "DECIMAL", "REAL", "NUMERIC"].iter().any(|t| ty.contains(t)) {
        value.as_f64().map(Value::Float).unwrap_or(Value::Null)
    } else if ty.contains("BOOL") {
        value.truthiness().map(Value::Bool).unwrap_or(Value::Null)
    } else {
        Value::Text(value.render())
    }
}

fn map_text(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        v => Value::Text(f(&v.render())),
    }
}

fn type_error(op: &str, value: &Value) -> GatewayError {
    GatewayError::Validation(format!("cannot apply {} to {} value '{}'", op, value.type_name(), value))
}

/// Lowercased unqualified function name.
pub fn function_name(function: &Function) -> String {
    object_name_parts(&function.name)
        .last()
        .map(|n| n.to_lowercase())
        .unwrap_or_default()
}

/// Whether `expr` contains an aggregate call.
pub fn contains_aggregate(expr: &Expr) -> bool {
    match expr {
        Expr::Function(f) => {
            AGGREGATES.contains(&function_name(f).as_str())
                || match &f.args {
                    FunctionArguments::List(list) => list.args.iter().any(|a| match a {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => contains_aggregate(e),
                        _ => false,
                    }),
                    _ => false,
                }
        }
        Expr::BinaryOp { left, right, .. } => contains_aggregate(left) || contains_aggregate(right),
        Expr::UnaryOp { expr, .. }
        | Expr::Nested(expr)
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr)
        | Expr::Cast { expr, .. } => contains_aggregate(expr),
        _ => false,
    }
}

/// Output name of a projection item: the alias when given, the raw content
/// of a string literal, the number as written, the column name for column
/// references and the SQL rendering otherwise.
pub fn column_name(item: &SelectItem) -> String {
    match item {
        SelectItem::ExprWithAlias { alias, .. } => alias.value.clone(),
        SelectItem::UnnamedExpr(expr) => expr_name(expr),
        other => other.to_string(),
    }
}

pub fn expr_name(expr: &Expr) -> String {
    match expr {
        Expr::Value(v) => match &v.value {
            SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => s.clone(),
            SqlValue::Number(n, _) => n.clone(),
            other => other.to_string(),
        },
        Expr::Identifier(ident) if !ident.value.starts_with("@@") => ident.value.clone(),
        Expr::CompoundIdentifier(parts) if !parts.iter().any(|p| p.value.starts_with("@@")) => {
            parts.last().map(|p| p.value.clone()).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedsql_sql::parser::parse_query;
    use sqlparser::ast::SetExpr;

    fn items(sql: &str) -> Vec<SelectItem> {
        match *parse_query(sql).unwrap().body {
            SetExpr::Select(select) => select.projection,
            other => panic!("unexpected body {:?}", other),
        }
    }

    fn eval_const(sql: &str) -> Value {
        let evaluator = Evaluator::new("mindsdb", 7);
        match &items(sql)[0] {
            SelectItem::UnnamedExpr(e) | SelectItem::ExprWithAlias { expr: e, .. } => {
                evaluator.eval(e, &Scope::empty()).unwrap()
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_constant_naming() {
        let names: Vec<String> = ["select 1", "select 'a'", "select \"a\"", "select 1 + 2", "select 'a' b"]
            .iter()
            .map(|sql| column_name(&items(sql)[0]))
            .collect();
        assert_eq!(names, vec!["1", "a", "a", "1 + 2", "b"]);
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        assert_eq!(eval_const("select 1 + 2 * 3"), Value::Int(7));
        assert_eq!(eval_const("select 7 / 2"), Value::Float(3.5));
        assert_eq!(eval_const("select 1 / 0"), Value::Null);
        assert_eq!(eval_const("select '10' > 9"), Value::Bool(true));
        assert_eq!(eval_const("select null = null"), Value::Null);
        assert_eq!(eval_const("select 3 between 1 and 5"), Value::Bool(true));
        assert_eq!(eval_const("select 'abc' like 'A%'"), Value::Bool(true));
        assert_eq!(eval_const("select 2 in (1, null)"), Value::Null);
    }

    #[test]
    fn test_session_functions_and_variables() {
        assert_eq!(eval_const("select database()"), Value::from("mindsdb"));
        assert_eq!(eval_const("select connection_id()"), Value::Int(7));
        assert_eq!(eval_const("select @@version_comment"), Value::from("FedSQL gateway"));
        assert_eq!(eval_const("select upper(concat('a', 'b'))"), Value::from("AB"));
        assert_eq!(eval_const("select coalesce(null, 2)"), Value::Int(2));
    }

    #[test]
    fn test_column_lookup_is_case_insensitive_and_qualified() {
        let columns = vec![
            BoundColumn::new("sqft", &["ta".to_string()]),
            BoundColumn::new("rental_price", &["p".to_string()]),
        ];
        let row = vec![Value::Int(1000), Value::Int(3000)];
        let scope = Scope::row(&columns, &row);
        let evaluator = Evaluator::new("files", 0);
        let expr = |sql: &str| match &items(sql)[0] {
            SelectItem::UnnamedExpr(e) => e.clone(),
            other => panic!("unexpected item {:?}", other),
        };

        assert_eq!(evaluator.eval(&expr("select SQFT"), &scope).unwrap(), Value::Int(1000));
        assert_eq!(evaluator.eval(&expr("select p.rental_price"), &scope).unwrap(), Value::Int(3000));
        assert!(matches!(
            evaluator.eval(&expr("select ta.rental_price"), &scope),
            Err(GatewayError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_aggregates_need_a_group() {
        let columns = vec![BoundColumn::new("x", &[])];
        let rows = vec![vec![Value::Int(1)], vec![Value::Int(3)], vec![Value::Null]];
        let evaluator = Evaluator::new("files", 0);
        let agg = |sql: &str| match &items(sql)[0] {
            SelectItem::UnnamedExpr(e) => evaluator.eval(e, &Scope::group(&columns, &rows)).unwrap(),
            other => panic!("unexpected item {:?}", other),
        };
        assert_eq!(agg("select count(*)"), Value::Int(3));
        assert_eq!(agg("select count(x)"), Value::Int(2));
        assert_eq!(agg("select sum(x)"), Value::Int(4));
        assert_eq!(agg("select avg(x)"), Value::Float(2.0));
        assert_eq!(agg("select max(x) - min(x)"), Value::Int(2));

        let SelectItem::UnnamedExpr(e) = &items("select count(*)")[0] else {
            panic!("expected expression");
        };
        assert!(contains_aggregate(e));
        assert!(evaluator.eval(e, &Scope::row(&columns, &rows[0])).is_err());
    }
}
