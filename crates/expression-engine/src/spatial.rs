//! Spatial functions offered through the custom function hook.

use crate::{
    context::EvalContext,
    error::Result,
    functions::{expect_arity, is_null_literal, text_value, type_mismatch},
    registry::{Checker, CustomFunctionRegistrar, EvaluatorFn, OperationDef},
};
use lazy_static::lazy_static;
use model::FieldType;
use sql_syntax::{ExprNode, Operator};
use std::collections::HashMap;
use wkb::{ByteOrder, Geometry, read_geometry_type};

lazy_static! {
    static ref SPATIAL_FUNCTIONS: HashMap<String, OperationDef> = build_spatial_functions();
}

fn build_spatial_functions() -> HashMap<String, OperationDef> {
    let def = |name: &'static str, checker: Checker, evaluator: EvaluatorFn| OperationDef {
        name,
        operator: Operator::CustomFunc,
        checker,
        evaluator,
    };
    [
        def("ST_Area", check_area, eval_area),
        def("ST_GeometryType", check_geometry_type, eval_geometry_type),
        def("ST_GeomFromText", check_geom_from_text, eval_geom_from_text),
        def("ST_AsText", check_as_text, eval_as_text),
    ]
    .into_iter()
    .map(|def| (def.name.to_ascii_uppercase(), def))
    .collect()
}

/// `ST_Area`, `ST_GeometryType`, `ST_GeomFromText` and `ST_AsText`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialFunctions;

impl CustomFunctionRegistrar for SpatialFunctions {
    fn get_operator(&self, name: &str) -> Option<OperationDef> {
        SPATIAL_FUNCTIONS.get(&name.to_ascii_uppercase()).copied()
    }
}

fn single_argument_of(node: &ExprNode, accepted: fn(FieldType) -> bool) -> Result<()> {
    expect_arity(node, 1, 1)?;
    let arg = &node.args()[0];
    if accepted(arg.field_type) || is_null_literal(arg) {
        Ok(())
    } else {
        Err(type_mismatch(node))
    }
}

fn is_geometry(field_type: FieldType) -> bool {
    field_type == FieldType::Geometry
}

fn is_text(field_type: FieldType) -> bool {
    field_type == FieldType::String
}

/// The geometry argument, `None` for a null one.
fn geometry_argument<'a>(node: &ExprNode, args: &[&'a ExprNode]) -> Result<Option<&'a Geometry>> {
    match args {
        [arg] if arg.is_null => Ok(None),
        [arg] => arg.as_geometry().map(Some).ok_or_else(|| type_mismatch(node)),
        _ => Err(type_mismatch(node)),
    }
}

fn check_area(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    single_argument_of(node, is_geometry)?;
    Ok(FieldType::Float)
}

/// Planar area of polygons and multipolygons; zero for other geometries.
fn eval_area(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Ok(match geometry_argument(node, args)? {
        Some(geometry) => ExprNode::float(geometry.area()),
        None => ExprNode::typed_null(FieldType::Float),
    })
}

fn check_geometry_type(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    single_argument_of(node, is_geometry)?;
    Ok(FieldType::String)
}

/// Type name as read back from the WKB header, e.g. `POLYGON Z`.
fn eval_geometry_type(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    let Some(geometry) = geometry_argument(node, args)? else {
        return Ok(ExprNode::typed_null(FieldType::String));
    };
    let (_, geometry_type) = read_geometry_type(&geometry.to_wkb(ByteOrder::native()))?;
    Ok(ExprNode::string(&geometry_type.to_string()))
}

fn check_geom_from_text(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    single_argument_of(node, is_text)?;
    Ok(FieldType::Geometry)
}

fn eval_geom_from_text(_: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    match args.first() {
        Some(arg) if !arg.is_null => Ok(ExprNode::geometry(Some(Geometry::from_wkt(
            &text_value(arg),
        )?))),
        _ => Ok(ExprNode::geometry(None)),
    }
}

fn check_as_text(node: &mut ExprNode, _: bool) -> Result<FieldType> {
    single_argument_of(node, is_geometry)?;
    Ok(FieldType::String)
}

fn eval_as_text(node: &ExprNode, args: &[&ExprNode], _: &EvalContext) -> Result<ExprNode> {
    Ok(match geometry_argument(node, args)? {
        Some(geometry) => ExprNode::string(&geometry.to_wkt()),
        None => ExprNode::typed_null(FieldType::String),
    })
}
