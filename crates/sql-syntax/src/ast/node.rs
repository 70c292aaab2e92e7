use crate::ast::operator::Operator;
use model::core::field_type::FieldType;
use wkb::Geometry;

/// Payload of a constant node. Integer, Integer64 and Boolean constants share
/// the `Integer` slot; String, Date, Time and Timestamp share `String`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Float(f64),
    String(String),
    Geometry(Option<Geometry>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRef {
    pub table_name: Option<String>,
    pub name: String,
    /// Set once the column has been resolved against a schema.
    pub table_index: Option<usize>,
    pub field_index: Option<usize>,
}

impl ColumnRef {
    pub fn new(table_name: Option<&str>, name: &str) -> Self {
        Self {
            table_name: table_name.map(str::to_string),
            name: name.to_string(),
            table_index: None,
            field_index: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.field_index.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: Operator,
    /// Function name of a `CustomFunc` node.
    pub function_name: Option<String>,
    pub args: Vec<ExprNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Constant(ConstantValue),
    Column(ColumnRef),
    Operation(Operation),
}

/// A node of an expression tree. A node exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub kind: NodeKind,
    pub field_type: FieldType,
    pub is_null: bool,
}

impl Default for ExprNode {
    fn default() -> Self {
        Self::integer(0)
    }
}

impl ExprNode {
    fn constant(value: ConstantValue, field_type: FieldType) -> Self {
        Self {
            kind: NodeKind::Constant(value),
            field_type,
            is_null: false,
        }
    }

    pub fn integer(value: i32) -> Self {
        Self::constant(ConstantValue::Integer(value as i64), FieldType::Integer)
    }

    pub fn integer64(value: i64) -> Self {
        Self::constant(ConstantValue::Integer(value), FieldType::Integer64)
    }

    pub fn float(value: f64) -> Self {
        Self::constant(ConstantValue::Float(value), FieldType::Float)
    }

    pub fn boolean(value: bool) -> Self {
        Self::constant(ConstantValue::Integer(value as i64), FieldType::Boolean)
    }

    pub fn string(value: &str) -> Self {
        Self::constant(ConstantValue::String(value.to_string()), FieldType::String)
    }

    /// A string constant, or a null one when `value` is absent.
    pub fn nullable_string(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::string(v),
            None => Self {
                is_null: true,
                ..Self::string("")
            },
        }
    }

    pub fn geometry(value: Option<Geometry>) -> Self {
        let is_null = value.is_none();
        Self {
            is_null,
            ..Self::constant(ConstantValue::Geometry(value), FieldType::Geometry)
        }
    }

    /// The SQL `NULL` literal: a null integer constant.
    pub fn null() -> Self {
        Self {
            is_null: true,
            ..Self::integer(0)
        }
    }

    /// A null constant of the given type.
    pub fn typed_null(field_type: FieldType) -> Self {
        let value = match field_type {
            FieldType::Float => ConstantValue::Float(0.0),
            FieldType::Geometry => ConstantValue::Geometry(None),
            t if t.is_string_like() => ConstantValue::String(String::new()),
            _ => ConstantValue::Integer(0),
        };
        Self {
            is_null: true,
            ..Self::constant(value, field_type)
        }
    }

    pub fn column(table_name: Option<&str>, name: &str) -> Self {
        Self {
            kind: NodeKind::Column(ColumnRef::new(table_name, name)),
            field_type: FieldType::Other,
            is_null: false,
        }
    }

    /// An operation node without arguments yet.
    pub fn operation(operator: Operator) -> Self {
        Self::operation_with(operator, Vec::new())
    }

    pub fn operation_with(operator: Operator, args: Vec<ExprNode>) -> Self {
        Self {
            kind: NodeKind::Operation(Operation {
                operator,
                function_name: None,
                args,
            }),
            field_type: FieldType::Other,
            is_null: false,
        }
    }

    /// A call to a function provided by a custom registrar.
    pub fn custom_function(name: &str, args: Vec<ExprNode>) -> Self {
        Self {
            kind: NodeKind::Operation(Operation {
                operator: Operator::CustomFunc,
                function_name: Some(name.to_string()),
                args,
            }),
            field_type: FieldType::Other,
            is_null: false,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant(_))
    }

    pub fn is_column(&self) -> bool {
        matches!(self.kind, NodeKind::Column(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self.kind, NodeKind::Operation(_))
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.kind {
            NodeKind::Operation(op) => Some(op.operator),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match &self.kind {
            NodeKind::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match &self.kind {
            NodeKind::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Integer payload of a non-null integer, Integer64 or boolean constant.
    pub fn as_integer(&self) -> Option<i64> {
        match &self.kind {
            NodeKind::Constant(ConstantValue::Integer(v)) if !self.is_null => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload of a non-null constant, widened to a float.
    pub fn as_float(&self) -> Option<f64> {
        match &self.kind {
            NodeKind::Constant(ConstantValue::Float(v)) if !self.is_null => Some(*v),
            NodeKind::Constant(ConstantValue::Integer(v)) if !self.is_null => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Constant(ConstantValue::String(s)) if !self.is_null => Some(s),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Constant(ConstantValue::Geometry(g)) if !self.is_null => g.as_ref(),
            _ => None,
        }
    }

    /// Truth value of a boolean result. Null is not true.
    pub fn is_true(&self) -> bool {
        self.as_integer().is_some_and(|v| v != 0)
    }

    /// Arguments of an operation; empty for leaves.
    pub fn args(&self) -> &[ExprNode] {
        match &self.kind {
            NodeKind::Operation(op) => &op.args,
            _ => &[],
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<ExprNode>> {
        match &mut self.kind {
            NodeKind::Operation(op) => Some(&mut op.args),
            _ => None,
        }
    }

    pub fn sub_expression_count(&self) -> usize {
        self.args().len()
    }

    /// Appends an argument. Leaves have no argument list and ignore the call.
    pub fn push_sub_expression(&mut self, child: ExprNode) {
        debug_assert!(self.is_operation(), "only operations take arguments");
        if let Some(args) = self.args_mut() {
            args.push(child);
        }
    }

    pub fn reverse_sub_expressions(&mut self) {
        if let Some(args) = self.args_mut() {
            args.reverse();
        }
    }

    /// Retags a string constant as a timestamp. Other nodes are left alone.
    pub fn mark_as_timestamp(&mut self) {
        if matches!(self.kind, NodeKind::Constant(ConstantValue::String(_)))
            && self.field_type == FieldType::String
        {
            self.field_type = FieldType::Timestamp;
        }
    }

    /// Moves the node out, leaving a default constant in its place.
    pub fn take(&mut self) -> ExprNode {
        std::mem::take(self)
    }
}
