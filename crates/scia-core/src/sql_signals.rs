//! SQL signal extractor: pulls structural hints (referenced tables,
//! columns, `GROUP BY` columns, equi-join key pairs) out of raw SQL text
//! (spec §4.3).
//!
//! Table extraction follows the traversal shape of
//! `flowscope-core::extractors::extract_tables`
//! (`SetExpr::{Select,Query,SetOperation}` / `TableFactor::{Table,Derived,
//! NestedJoin}`); column, `GROUP BY`, and join-key extraction follow
//! `flowscope-core::linter::rules::semantic_helpers::visit_select_expressions`
//! / `join_on_expr`. Generalized from
//! `original_source/scia/sql/parser.py::parse_sql`'s four extraction
//! passes over a `sqlglot` tree.

use crate::types::{Dialect, SqlMetadata, SqlSignals};
use sqlparser::ast::{
    BinaryOperator, Expr, GroupByExpr, Join, JoinConstraint, JoinOperator, Query, Select,
    SelectItem, SetExpr, Statement, TableFactor,
};
use sqlparser::parser::Parser;

/// Parses every entry of `statements` (name -> SQL text) with `dialect`
/// and extracts its [`SqlMetadata`]. Entries whose SQL fails to parse are
/// simply absent from the result — this function never panics.
pub fn extract_signals(statements: &std::collections::BTreeMap<String, String>, dialect: Dialect) -> SqlSignals {
    let mut signals = SqlSignals::new();
    for (name, sql) in statements {
        if let Some(metadata) = extract_one(sql, dialect) {
            signals.insert(name.clone(), metadata);
        }
    }
    signals
}

/// Extracts [`SqlMetadata`] from a single SQL statement string, or `None`
/// if it fails to parse.
pub fn extract_one(sql: &str, dialect: Dialect) -> Option<SqlMetadata> {
    let parsed = Parser::parse_sql(dialect.to_sqlparser_dialect().as_ref(), sql).ok()?;
    let mut metadata = SqlMetadata::default();
    for statement in &parsed {
        walk_statement(statement, &mut metadata);
    }
    Some(metadata)
}

fn walk_statement(statement: &Statement, metadata: &mut SqlMetadata) {
    if let Statement::Query(query) = statement {
        walk_query(query, metadata);
    }
}

fn walk_query(query: &Query, metadata: &mut SqlMetadata) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            walk_query(&cte.query, metadata);
        }
    }
    walk_set_expr(&query.body, metadata);
}

fn walk_set_expr(body: &SetExpr, metadata: &mut SqlMetadata) {
    match body {
        SetExpr::Select(select) => walk_select(select, metadata),
        SetExpr::Query(query) => walk_query(query, metadata),
        SetExpr::SetOperation { left, right, .. } => {
            walk_set_expr(left, metadata);
            walk_set_expr(right, metadata);
        }
        _ => {}
    }
}

fn walk_select(select: &Select, metadata: &mut SqlMetadata) {
    for table_with_joins in &select.from {
        walk_table_factor(&table_with_joins.relation, metadata);
        for join in &table_with_joins.joins {
            walk_table_factor(&join.relation, metadata);
            collect_join_keys(join, metadata);
        }
    }

    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                collect_columns(expr, metadata);
            }
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {}
        }
    }

    if let Some(selection) = &select.selection {
        collect_columns(selection, metadata);
    }

    if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
        for expr in exprs {
            collect_columns(expr, metadata);
            if let Some(name) = column_name_of(expr) {
                metadata.group_by_cols.insert(name);
            }
        }
    }

    if let Some(having) = &select.having {
        collect_columns(having, metadata);
    }
}

fn walk_table_factor(table_factor: &TableFactor, metadata: &mut SqlMetadata) {
    match table_factor {
        TableFactor::Table { name, .. } => {
            metadata.tables.insert(last_component(&name.to_string()));
        }
        TableFactor::Derived { subquery, .. } => {
            walk_query(subquery, metadata);
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            walk_table_factor(&table_with_joins.relation, metadata);
            for join in &table_with_joins.joins {
                walk_table_factor(&join.relation, metadata);
                collect_join_keys(join, metadata);
            }
        }
        _ => {}
    }
}

/// Records a `(x, y)` pair (upper-cased) for each two-column equality in a
/// join's `ON` clause; more complex predicates are ignored.
fn collect_join_keys(join: &Join, metadata: &mut SqlMetadata) {
    let Some(on_expr) = join_on_expr(&join.join_operator) else {
        return;
    };
    collect_columns(on_expr, metadata);
    collect_equi_join_pairs(on_expr, metadata);
}

fn collect_equi_join_pairs(expr: &Expr, metadata: &mut SqlMetadata) {
    match expr {
        Expr::BinaryOp { left, op, right } => match op {
            BinaryOperator::Eq => {
                if let (Some(a), Some(b)) = (column_name_of(left), column_name_of(right)) {
                    metadata.join_keys.push((a, b));
                }
            }
            BinaryOperator::And => {
                collect_equi_join_pairs(left, metadata);
                collect_equi_join_pairs(right, metadata);
            }
            _ => {}
        },
        Expr::Nested(inner) => collect_equi_join_pairs(inner, metadata),
        _ => {}
    }
}

fn join_on_expr(join_operator: &JoinOperator) -> Option<&Expr> {
    let constraint = match join_operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint) => constraint,
        JoinOperator::AsOf { constraint, .. } => constraint,
        _ => return None,
    };
    match constraint {
        JoinConstraint::On(expr) => Some(expr),
        _ => None,
    }
}

/// Recursively records every column reference (`Identifier` and
/// `CompoundIdentifier`) found in `expr`.
fn collect_columns(expr: &Expr, metadata: &mut SqlMetadata) {
    if let Some(name) = column_name_of(expr) {
        metadata.columns.insert(name);
        return;
    }
    match expr {
        Expr::BinaryOp { left, right, .. } => {
            collect_columns(left, metadata);
            collect_columns(right, metadata);
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) | Expr::Cast { expr, .. } => {
            collect_columns(expr, metadata);
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            collect_columns(expr, metadata);
            collect_columns(low, metadata);
            collect_columns(high, metadata);
        }
        Expr::InList { expr, list, .. } => {
            collect_columns(expr, metadata);
            for item in list {
                collect_columns(item, metadata);
            }
        }
        Expr::IsNull(inner) | Expr::IsNotNull(inner) => collect_columns(inner, metadata),
        Expr::Function(func) => {
            if let sqlparser::ast::FunctionArguments::List(list) = &func.args {
                for arg in &list.args {
                    if let sqlparser::ast::FunctionArg::Unnamed(
                        sqlparser::ast::FunctionArgExpr::Expr(e),
                    )
                    | sqlparser::ast::FunctionArg::Named {
                        arg: sqlparser::ast::FunctionArgExpr::Expr(e),
                        ..
                    } = arg
                    {
                        collect_columns(e, metadata);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Extracts a bare upper-cased column name from `Identifier` or the final
/// part of a `CompoundIdentifier`.
fn column_name_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_uppercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.to_uppercase()),
        _ => None,
    }
}

fn last_component(qualified: &str) -> String {
    qualified
        .rsplit('.')
        .next()
        .unwrap_or(qualified)
        .to_uppercase()
}
