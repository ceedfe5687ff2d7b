use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    is_dir: bool,
}

impl Node {
    fn insert(&mut self, path: &str) {
        let mut current = self;
        let mut parts = path.split('/').filter(|p| !p.is_empty()).peekable();
        while let Some(part) = parts.next() {
            let is_last = parts.peek().is_none();
            current = current.children.entry(part.to_string()).or_default();
            if !is_last {
                current.is_dir = true;
            }
        }
    }
}

/// Renders relative `/`-separated file paths as a directory tree.
///
/// ```
/// use migration_planner::ingest::render_tree;
///
/// let tree = render_tree("app", &["pom.xml".to_string(), "src/A.java".to_string()]);
/// assert!(tree.starts_with("Directory structure:\n└── app/\n"));
/// ```
pub fn render_tree(root_name: &str, paths: &[String]) -> String {
    let mut root = Node {
        is_dir: true,
        ..Default::default()
    };
    for path in paths {
        root.insert(path);
    }

    let mut out = String::from("Directory structure:\n");
    out.push_str("└── ");
    out.push_str(root_name);
    out.push_str("/\n");
    render_children(&root, "    ", &mut out);
    out
}

fn render_children(node: &Node, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(name);
        if child.is_dir {
            out.push('/');
        }
        out.push('\n');

        if child.is_dir {
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_children(child, &next, out);
        }
    }
}
