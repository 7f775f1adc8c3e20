/// Page-side helpers used by mounted widgets. Script loading is not part of
/// it; that goes through [`INJECT_SCRIPT`] under the loader's control.
pub const RUNTIME: &str = r#"
window.$$HREPR = window.$$HREPR || {
    fromHTML(html) {
        const node = document.createElement("div");
        node.innerHTML = html;
        return node.childNodes[0];
    },
    prepare(nodeId) {
        const self = document.getElementById(nodeId);
        let resolve = null;
        self.__object = new Promise(rs => { resolve = rs; });
        self.__object.__resolve = resolve;
        return self;
    },
    swap(orig, repl) {
        if (!repl) {
            return;
        }
        if (repl.getElement) {
            repl = repl.getElement();
        }
        if (repl instanceof HTMLElement) {
            repl.__object = orig.__object;
            repl.setAttribute("id", orig.getAttribute("id"));
            orig.replaceWith(repl);
        }
        else {
            orig.remove();
        }
    },
};
true
"#;

pub const INJECT_SCRIPT: &str = r#"
(src, module) => new Promise((resolve) => {
    const tag = document.createElement("script");
    tag.src = src;
    if (module) tag.type = "module";
    tag.onload = () => resolve({ loaded: true });
    tag.onerror = () => resolve({ loaded: false, error: "error event for " + src });
    document.head.appendChild(tag);
})
"#;

pub const HAS_RUNTIME: &str = r#"
() => typeof window.$$HREPR === "object"
"#;

pub const OBJECT_STATE: &str = r#"
(nodeId) => {
    const el = document.getElementById(nodeId);
    if (!el) return { exists: false };
    return { exists: true, prepared: !!el.__object, tag: el.tagName.toLowerCase(), text: el.innerText };
}
"#;
