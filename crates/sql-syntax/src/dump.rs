use crate::{
    ast::node::{ConstantValue, ExprNode, NodeKind},
    unparse::format_g15,
};

impl ExprNode {
    /// Indented tree listing, one node per line, two spaces per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let spaces = " ".repeat(depth * 2);
        match &self.kind {
            NodeKind::Column(column) => {
                let index = column.field_index.map_or(-1, |i| i as i64);
                out.push_str(&format!("{spaces}  Field {index}\n"));
            }
            NodeKind::Constant(value) => {
                let text = match value {
                    ConstantValue::Integer(v) => v.to_string(),
                    ConstantValue::Float(v) => format_g15(*v),
                    ConstantValue::Geometry(Some(g)) => g.to_wkt(),
                    ConstantValue::Geometry(None) => "(null)".to_string(),
                    ConstantValue::String(s) => s.clone(),
                };
                out.push_str(&format!("{spaces}  {text}\n"));
            }
            NodeKind::Operation(op) => {
                let name = op
                    .function_name
                    .as_deref()
                    .unwrap_or_else(|| op.operator.name());
                out.push_str(&format!("{spaces}{name}\n"));
                for arg in &op.args {
                    arg.dump_into(out, depth + 1);
                }
            }
        }
    }
}
