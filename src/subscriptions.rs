//! Event-Subscription Matcher
//!
//! Finds `Target.Event += Handler;` statements at the top level of static method
//! bodies and turns each into the matching `-=` detachment. Subscriptions nested in
//! blocks, conditionals or loops are not looked at.

use serde::{Deserialize, Serialize};

use crate::collect::HandlerSet;
use crate::syntax::{
    AssignmentOperator, Expression, ExpressionStatement, Modifier, Statement, TypeDecl,
};

/// A detachment statement, ready to be emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetachment {
    pub statement: String,
    pub handler: String,
}

pub fn match_detachments(decl: &TypeDecl, handlers: &HandlerSet) -> Vec<EventDetachment> {
    if handlers.is_empty() {
        return Vec::new();
    }

    decl.methods()
        .filter(|method| method.has_modifier(Modifier::Static))
        .filter_map(|method| method.body.as_deref())
        .flat_map(|body| body.iter())
        .filter_map(|statement| match statement {
            Statement::Expression(stmt) => match_subscription(stmt, handlers),
            Statement::Other { .. } => None,
        })
        .collect()
}

/// Matches one expression statement against the subscription shape.
pub fn match_subscription(
    stmt: &ExpressionStatement,
    handlers: &HandlerSet,
) -> Option<EventDetachment> {
    let Expression::Assignment {
        left,
        operator: AssignmentOperator::AddAssign,
        operator_offset,
        right,
    } = &stmt.expression
    else {
        return None;
    };

    let Expression::Identifier { name: handler } = right.as_ref() else {
        return None;
    };
    if !handlers.contains(handler) || !left.is_identifier_chain() {
        return None;
    }

    let statement = detach_text(&stmt.text, *operator_offset)?;
    Some(EventDetachment {
        statement,
        handler: handler.clone(),
    })
}

/// Swaps the `+=` token at `offset` for `-=`; every other byte is kept.
fn detach_text(text: &str, offset: usize) -> Option<String> {
    let token = AssignmentOperator::AddAssign.token();
    let end = offset.checked_add(token.len())?;
    if text.get(offset..end)? != token {
        return None;
    }

    let mut detached = String::with_capacity(text.len());
    detached.push_str(&text[..offset]);
    detached.push_str(AssignmentOperator::SubtractAssign.token());
    detached.push_str(&text[end..]);
    Some(detached.trim().to_string())
}
