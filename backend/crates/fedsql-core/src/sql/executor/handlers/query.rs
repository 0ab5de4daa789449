//! SELECT handler.
//!
//! Builds an in-memory relation from the single FROM item (a table, a
//! derived query, or a table joined with a predictor), then filters,
//! projects, orders, de-duplicates and limits it.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use fedsql_commons::Value;
use fedsql_sql::parser::object_name_parts;
use sqlparser::ast::{
    BinaryOperator, Distinct, Expr, GroupByExpr, LimitClause, OrderByKind, Query, Select, SelectItem,
    SelectItemQualifiedWildcardKind, SetExpr, TableFactor, TableWithJoins,
};

use crate::error::{GatewayError, GatewayResult};
use crate::predictors::parse_versioned_name;
use crate::registry::TableSource;
use crate::result::TableData;
use crate::sql::eval::{column_name, contains_aggregate, expr_name, BoundColumn, Evaluator, Scope};
use crate::sql::executor::SqlExecutor;
use crate::sql::ExecutionContext;

/// Rows with bound column names.
struct Relation {
    columns: Vec<BoundColumn>,
    rows: Vec<Vec<Value>>,
    /// The WHERE clause was used to build the rows (predictor input)
    where_consumed: bool,
}

impl Relation {
    fn from_table(data: TableData, qualifiers: &[String]) -> Self {
        Self {
            columns: data
                .columns
                .into_iter()
                .map(|c| BoundColumn::new(c, qualifiers))
                .collect(),
            rows: data.rows,
            where_consumed: false,
        }
    }
}

/// A resolved FROM item before it is read.
enum Factor {
    Table {
        source: TableSource,
        qualifiers: Vec<String>,
    },
    Derived {
        data: TableData,
        qualifiers: Vec<String>,
    },
}

enum Projected<'q> {
    Column(usize),
    Expr(&'q Expr),
}

type QueryFuture<'a> = Pin<Box<dyn Future<Output = GatewayResult<TableData>> + Send + 'a>>;

impl SqlExecutor {
    /// Run a query. Boxed so derived tables can recurse.
    pub(crate) fn run_query<'a>(&'a self, query: &'a Query, ctx: &'a ExecutionContext) -> QueryFuture<'a> {
        Box::pin(async move { self.select(query, ctx).await })
    }

    pub(crate) async fn select(&self, query: &Query, ctx: &ExecutionContext) -> GatewayResult<TableData> {
        if query.with.is_some() {
            return Err(GatewayError::NotSupported("WITH clauses".to_string()));
        }
        let select: &Select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            SetExpr::Query(inner) if query.limit_clause.is_none() && query.order_by.is_none() => {
                return self.run_query(inner, ctx).await;
            }
            other => {
                return Err(GatewayError::NotSupported(format!("query form: {}", other)));
            }
        };

        match &select.group_by {
            GroupByExpr::Expressions(exprs, _) if exprs.is_empty() => {}
            _ => return Err(GatewayError::NotSupported("GROUP BY".to_string())),
        }
        if select.having.is_some() {
            return Err(GatewayError::NotSupported("HAVING".to_string()));
        }
        let distinct = match &select.distinct {
            None => false,
            Some(Distinct::Distinct) => true,
            Some(_) => return Err(GatewayError::NotSupported("DISTINCT ON".to_string())),
        };

        let evaluator = Evaluator::new(ctx.database(), ctx.connection_id());
        let (limit, offset) = limit_offset(query, &evaluator)?;
        let order_by = order_by(query)?;
        let aggregate = select.projection.iter().any(|item| match item {
            SelectItem::UnnamedExpr(e) | SelectItem::ExprWithAlias { expr: e, .. } => contains_aggregate(e),
            _ => false,
        });

        // Only plain scans can stop reading early
        let pushdown = match limit {
            Some(limit) if select.selection.is_none() && !aggregate && order_by.is_empty() && !distinct => {
                Some(limit + offset)
            }
            _ => None,
        };

        let mut relation = self
            .load_from(&select.from, select.selection.as_ref(), pushdown, ctx, &evaluator)
            .await?;

        if let Some(selection) = &select.selection {
            if !relation.where_consumed {
                let mut kept = Vec::with_capacity(relation.rows.len());
                for row in relation.rows {
                    if evaluator.is_true(selection, &Scope::row(&relation.columns, &row))? {
                        kept.push(row);
                    }
                }
                relation.rows = kept;
            }
        }

        let (names, projected) = expand_projection(&select.projection, &relation.columns)?;
        let project = |scope: &Scope<'_>| -> GatewayResult<Vec<Value>> {
            projected
                .iter()
                .map(|p| match p {
                    Projected::Column(i) => Ok(scope.row.and_then(|r| r.get(*i)).cloned().unwrap_or(Value::Null)),
                    Projected::Expr(e) => evaluator.eval(e, scope),
                })
                .collect()
        };

        let mut output: Vec<Vec<Value>> = if aggregate {
            vec![project(&Scope::group(&relation.columns, &relation.rows))?]
        } else {
            let mut keyed = Vec::with_capacity(relation.rows.len());
            for row in &relation.rows {
                let scope = Scope::row(&relation.columns, row);
                let out = project(&scope)?;
                let keys = order_by
                    .iter()
                    .map(|(expr, _)| sort_key(expr, &names, &out, &scope, &evaluator))
                    .collect::<GatewayResult<Vec<Value>>>()?;
                keyed.push((keys, out));
            }
            if !order_by.is_empty() {
                keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &order_by));
            }
            keyed.into_iter().map(|(_, out)| out).collect()
        };

        if distinct {
            let mut seen = HashSet::new();
            output.retain(|row| seen.insert(serde_json::to_string(row).unwrap_or_default()));
        }
        let mut rows: Vec<Vec<Value>> = output.into_iter().skip(offset).collect();
        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        let mut data = TableData::new(names, rows);
        if data.truncate(self.max_result_rows) {
            log::warn!("Result truncated to {} rows", self.max_result_rows);
        }
        Ok(data)
    }

    async fn load_from(
        &self,
        from: &[TableWithJoins],
        selection: Option<&Expr>,
        pushdown: Option<usize>,
        ctx: &ExecutionContext,
        evaluator: &Evaluator<'_>,
    ) -> GatewayResult<Relation> {
        let item = match from {
            [] => {
                return Ok(Relation {
                    columns: Vec::new(),
                    rows: vec![Vec::new()],
                    where_consumed: false,
                })
            }
            [item] => item,
            _ => return Err(GatewayError::NotSupported("comma-separated FROM items".to_string())),
        };

        let left = self.resolve_factor(&item.relation, ctx).await?;
        match item.joins.as_slice() {
            [] => match left {
                Factor::Table {
                    source: TableSource::Predictor { project, name, version },
                    qualifiers,
                } => {
                    let input = equality_input(selection, evaluator, &project, &name)?;
                    let data = self
                        .predictors
                        .predict(ctx.tenant(), &project, &name, version, &input)?;
                    let mut relation = Relation::from_table(data, &qualifiers);
                    relation.where_consumed = true;
                    Ok(relation)
                }
                Factor::Table { source, qualifiers } => {
                    let data = self.registry.scan(ctx.tenant(), &source, pushdown).await?;
                    Ok(Relation::from_table(data, &qualifiers))
                }
                Factor::Derived { mut data, qualifiers } => {
                    if let Some(n) = pushdown {
                        data.truncate(n);
                    }
                    Ok(Relation::from_table(data, &qualifiers))
                }
            },
            [join] => {
                let right = self.resolve_factor(&join.relation, ctx).await?;
                let Factor::Table {
                    source: TableSource::Predictor { project, name, version },
                    qualifiers: right_qualifiers,
                } = right
                else {
                    return Err(GatewayError::NotSupported(
                        "JOIN is only supported with a model on the right side".to_string(),
                    ));
                };

                let (left_data, left_qualifiers) = match left {
                    Factor::Table {
                        source: TableSource::Predictor { .. },
                        ..
                    } => {
                        return Err(GatewayError::NotSupported(
                            "a model on the left side of JOIN".to_string(),
                        ))
                    }
                    Factor::Table { source, qualifiers } => {
                        (self.registry.scan(ctx.tenant(), &source, pushdown).await?, qualifiers)
                    }
                    Factor::Derived { mut data, qualifiers } => {
                        if let Some(n) = pushdown {
                            data.truncate(n);
                        }
                        (data, qualifiers)
                    }
                };

                let model = self.predictors.model(ctx.tenant(), &project, &name, version)?;
                let predicted = model.predict_table(&left_data);

                let mut columns: Vec<BoundColumn> = left_data
                    .columns
                    .iter()
                    .map(|c| BoundColumn::new(c.clone(), &left_qualifiers))
                    .collect();
                columns.extend(
                    predicted
                        .columns
                        .iter()
                        .map(|c| BoundColumn::new(c.clone(), &right_qualifiers)),
                );
                let rows = left_data
                    .rows
                    .into_iter()
                    .zip(predicted.rows)
                    .map(|(mut row, out)| {
                        row.extend(out);
                        row
                    })
                    .collect();
                Ok(Relation {
                    columns,
                    rows,
                    where_consumed: false,
                })
            }
            _ => Err(GatewayError::NotSupported("more than one JOIN".to_string())),
        }
    }

    async fn resolve_factor(&self, factor: &TableFactor, ctx: &ExecutionContext) -> GatewayResult<Factor> {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let parts = object_name_parts(name);
                let (db, table, version) = match parts.as_slice() {
                    [t] => (ctx.database().to_string(), t.clone(), None),
                    [d, t] => (d.clone(), t.clone(), None),
                    [d, t, v] => match v.parse::<u32>() {
                        Ok(v) => (d.clone(), t.clone(), Some(v)),
                        Err(_) => return Err(invalid_reference(&parts)),
                    },
                    _ => return Err(invalid_reference(&parts)),
                };

                let source = match self.registry.resolve(ctx.tenant(), &db, &table) {
                    Err(GatewayError::UnknownTable(t)) => {
                        // `name.version` written as one quoted identifier
                        match parse_versioned_name(&table) {
                            (base, Some(v)) if version.is_none() => {
                                match self.registry.resolve(ctx.tenant(), &db, &base)? {
                                    TableSource::Predictor { project, name, .. } => TableSource::Predictor {
                                        project,
                                        name,
                                        version: Some(v),
                                    },
                                    _ => return Err(GatewayError::UnknownTable(t)),
                                }
                            }
                            _ => return Err(GatewayError::UnknownTable(t)),
                        }
                    }
                    other => other?,
                };
                let source = match (source, version) {
                    (TableSource::Predictor { project, name, .. }, Some(v)) => TableSource::Predictor {
                        project,
                        name,
                        version: Some(v),
                    },
                    (_, Some(_)) => return Err(invalid_reference(&parts)),
                    (source, None) => source,
                };

                let mut qualifiers = vec![table];
                if let Some(alias) = alias {
                    qualifiers.push(alias.name.value.clone());
                }
                Ok(Factor::Table { source, qualifiers })
            }
            TableFactor::Derived { subquery, alias, .. } => {
                let data = self.run_query(subquery, ctx).await?;
                let qualifiers = alias.iter().map(|a| a.name.value.clone()).collect();
                Ok(Factor::Derived { data, qualifiers })
            }
            other => Err(GatewayError::NotSupported(format!("FROM item {}", other))),
        }
    }
}

fn invalid_reference(parts: &[String]) -> GatewayError {
    GatewayError::InvalidSql(format!("Invalid table reference '{}'", parts.join(".")))
}

/// One input row for a model built from `col = value` conjuncts.
fn equality_input(
    selection: Option<&Expr>,
    evaluator: &Evaluator<'_>,
    project: &str,
    name: &str,
) -> GatewayResult<TableData> {
    let mut pairs = Vec::new();
    if let Some(selection) = selection {
        collect_equalities(selection, evaluator, &mut pairs)?;
    }
    if pairs.is_empty() {
        return Err(GatewayError::Validation(format!(
            "model '{}.{}' must be queried with WHERE column = value conditions or a JOIN",
            project, name
        )));
    }
    let (columns, values): (Vec<String>, Vec<Value>) = pairs.into_iter().unzip();
    Ok(TableData::new(columns, vec![values]))
}

fn collect_equalities(expr: &Expr, evaluator: &Evaluator<'_>, out: &mut Vec<(String, Value)>) -> GatewayResult<()> {
    match expr {
        Expr::Nested(inner) => collect_equalities(inner, evaluator, out),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            collect_equalities(left, evaluator, out)?;
            collect_equalities(right, evaluator, out)
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            let (column, value) = match (column_ref(left), column_ref(right)) {
                (Some(column), _) => (column, right),
                (None, Some(column)) => (column, left),
                (None, None) => {
                    return Err(GatewayError::Validation(format!(
                        "model condition needs a column: {}",
                        expr
                    )))
                }
            };
            out.push((column, evaluator.eval(value, &Scope::empty())?));
            Ok(())
        }
        other => Err(GatewayError::NotSupported(format!(
            "model condition '{}'; use column = value joined with AND",
            other
        ))),
    }
}

fn column_ref(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.clone()),
        _ => None,
    }
}

fn expand_projection<'q>(
    items: &'q [SelectItem],
    columns: &[BoundColumn],
) -> GatewayResult<(Vec<String>, Vec<Projected<'q>>)> {
    let mut names = Vec::new();
    let mut projected = Vec::new();
    for item in items {
        match item {
            SelectItem::Wildcard(_) => {
                for (i, c) in columns.iter().enumerate() {
                    names.push(c.name.clone());
                    projected.push(Projected::Column(i));
                }
            }
            SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::ObjectName(name), _) => {
                let qualifier = object_name_parts(name).pop().unwrap_or_default().to_lowercase();
                let before = projected.len();
                for (i, c) in columns.iter().enumerate() {
                    if c.qualifiers.contains(&qualifier) {
                        names.push(c.name.clone());
                        projected.push(Projected::Column(i));
                    }
                }
                if projected.len() == before {
                    return Err(GatewayError::UnknownTable(qualifier));
                }
            }
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                names.push(column_name(item));
                projected.push(Projected::Expr(expr));
            }
            other => return Err(GatewayError::NotSupported(format!("select item {}", other))),
        }
    }
    Ok((names, projected))
}

fn limit_offset(query: &Query, evaluator: &Evaluator<'_>) -> GatewayResult<(Option<usize>, usize)> {
    let count = |expr: &Expr| -> GatewayResult<usize> {
        evaluator
            .eval(expr, &Scope::empty())?
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| GatewayError::InvalidSql(format!("LIMIT/OFFSET must be a non-negative integer: {}", expr)))
    };
    match &query.limit_clause {
        None => Ok((None, 0)),
        Some(LimitClause::LimitOffset { limit, offset, .. }) => {
            let limit = limit.as_ref().map(count).transpose()?;
            let offset = offset.as_ref().map(|o| count(&o.value)).transpose()?;
            Ok((limit, offset.unwrap_or(0)))
        }
        Some(LimitClause::OffsetCommaLimit { offset, limit }) => Ok((Some(count(limit)?), count(offset)?)),
    }
}

fn order_by(query: &Query) -> GatewayResult<Vec<(&Expr, bool)>> {
    match &query.order_by {
        None => Ok(Vec::new()),
        Some(order_by) => match &order_by.kind {
            OrderByKind::Expressions(exprs) => Ok(exprs
                .iter()
                .map(|o| (&o.expr, o.options.asc.unwrap_or(true)))
                .collect()),
            _ => Err(GatewayError::NotSupported("ORDER BY ALL".to_string())),
        },
    }
}

/// Position numbers and output aliases refer to the projection; anything
/// else is evaluated against the input row.
fn sort_key(
    expr: &Expr,
    names: &[String],
    out: &[Value],
    scope: &Scope<'_>,
    evaluator: &Evaluator<'_>,
) -> GatewayResult<Value> {
    if let Expr::Value(v) = expr {
        if let Some(pos) = crate::sql::eval::literal(&v.value).as_i64() {
            return usize::try_from(pos)
                .ok()
                .and_then(|p| p.checked_sub(1))
                .and_then(|p| out.get(p).cloned())
                .ok_or_else(|| GatewayError::InvalidSql(format!("ORDER BY position {} is out of range", pos)));
        }
    }
    if let Expr::Identifier(_) = expr {
        let name = expr_name(expr);
        if let Some(i) = names.iter().position(|n| n.eq_ignore_ascii_case(&name)) {
            return Ok(out[i].clone());
        }
    }
    evaluator.eval(expr, scope)
}

/// NULLs sort first in ascending order.
fn compare_keys(a: &[Value], b: &[Value], order_by: &[(&Expr, bool)]) -> Ordering {
    for ((x, y), (_, asc)) in a.iter().zip(b.iter()).zip(order_by.iter()) {
        let ord = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.sql_cmp(y).unwrap_or(Ordering::Equal),
        };
        let ord = if *asc { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
