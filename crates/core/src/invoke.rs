use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a callee must be invoked. Declared by whoever registers the callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invocation {
    /// A factory function, called as `f(...)`
    Call,
    /// A class, instantiated as `new C(...)`
    Construct,
}

/// A JavaScript callable reached from `target`, optionally through `symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callee {
    /// JavaScript expression evaluating to the callable or its owner
    pub target: String,
    pub symbol: Option<String>,
    pub kind: Invocation,
}

impl Callee {
    pub fn call(target: impl Into<String>) -> Self {
        Self { target: target.into(), symbol: None, kind: Invocation::Call }
    }

    pub fn construct(target: impl Into<String>) -> Self {
        Self { target: target.into(), symbol: None, kind: Invocation::Construct }
    }

    pub fn member(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Renders the invocation as a JavaScript expression.
    ///
    /// Arguments are JSON values; any other expression (a DOM node for
    /// instance) goes through `raw_args`, inserted before them verbatim.
    pub fn to_js(&self, raw_args: &[&str], args: &[Value]) -> String {
        let callee = match &self.symbol {
            Some(symbol) => format!("({})[{}]", self.target, Value::from(symbol.as_str())),
            None => format!("({})", self.target),
        };
        let args_str = raw_args
            .iter()
            .map(|a| a.to_string())
            .chain(args.iter().map(|v| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            Invocation::Call => format!("{}({})", callee, args_str),
            Invocation::Construct => format!("new ({})({})", callee, args_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructs_class() {
        let js = Callee::construct("Counter").to_js(&["node"], &[json!({"increment": 3})]);
        assert_eq!(js, r#"new ((Counter))(node, {"increment":3})"#);
    }

    #[test]
    fn calls_member_factory() {
        let js = Callee::call("by").member("two").to_js(&["node"], &[]);
        assert_eq!(js, r#"(by)["two"](node)"#);
    }

    #[test]
    fn symbol_is_escaped() {
        let js = Callee::call("lib").member("we\"ird").to_js(&[], &[json!(1)]);
        assert_eq!(js, r#"(lib)["we\"ird"](1)"#);
    }

    #[test]
    fn kind_round_trips_through_json() {
        let callee: Callee =
            serde_json::from_value(json!({"target": "mod", "symbol": "Counter", "kind": "construct"})).unwrap();
        assert_eq!(callee, Callee::construct("mod").member("Counter"));
    }
}
