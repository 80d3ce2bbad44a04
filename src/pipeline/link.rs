//! Continuation links.

/// `<request_path>?<query>` with `$skip` set to `next_skip`.
///
/// Every other parameter is kept in place; `$skip` is appended when the
/// original query had none.
pub fn next_link(request_path: &str, query: Option<&str>, next_skip: usize) -> String {
    let skip = format!("$skip={}", next_skip);
    let mut params: Vec<String> = Vec::new();
    let mut replaced = false;

    for param in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let name = param.split('=').next().unwrap_or(param);
        if name == "$skip" || name == "%24skip" {
            if !replaced {
                params.push(skip.clone());
                replaced = true;
            }
        } else {
            params.push(param.to_string());
        }
    }
    if !replaced {
        params.push(skip);
    }

    format!("{}?{}", request_path, params.join("&"))
}
