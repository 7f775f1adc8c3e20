pub mod runtime;

use hrepr_core::Callee;
use serde_json::{json, Value};

pub fn build_js_call(func: &str, args: &[Value]) -> String {
    let args_str = args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", func, args_str)
}

/// Script that prepares the node `node_id`, runs `callee` on it and resolves
/// the node's object. With `replace`, the node is a placeholder that gets
/// swapped for the result.
pub fn build_mount(node_id: &str, callee: &Callee, args: &[Value], replace: bool) -> String {
    format!(
        r#"(async () => {{
    const self = $$HREPR.prepare({id});
    const obj = {call};
    {swap}
    self.__object.__resolve(obj);
    return {{ mounted: true, replaced: !self.isConnected }};
}})()"#,
        id = json!(node_id),
        call = callee.to_js(&["self"], args),
        swap = if replace { "$$HREPR.swap(self, obj);" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_arguments_are_json() {
        let js = build_js_call("(a, b) => a + b", &[json!(1), json!("x")]);
        assert_eq!(js, r#"((a, b) => a + b)(1, "x")"#);
    }

    #[test]
    fn mount_invokes_the_declared_way() {
        let js = build_mount("H7", &Callee::construct("Counter"), &[json!({"increment": 3})], false);
        assert!(js.contains(r#"$$HREPR.prepare("H7")"#));
        assert!(js.contains(r#"const obj = new ((Counter))(self, {"increment":3});"#));
        assert!(!js.contains("$$HREPR.swap"));

        let js = build_mount("H8", &Callee::call("by").member("two"), &[], true);
        assert!(js.contains(r#"const obj = (by)["two"](self);"#));
        assert!(js.contains("$$HREPR.swap(self, obj);"));
    }
}
