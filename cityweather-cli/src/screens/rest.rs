//! Secondary screen reachable from the home screen. Placeholder content only.

pub fn render() -> String {
    "\n  Rest\n\n  Nothing here yet. Type :back to return.\n".to_string()
}
