//! # Bean Validation
//!
//! Constraint annotations derived from schema keywords.

use crate::model::{Annotation, ParameterValue};
use crate::oas::Constraints;
use crate::options::BeanValidation;

/// Annotations for the constraints of a schema, in a stable order:
/// `Size`, `Pattern`, `DecimalMin`, `DecimalMax`.
pub fn constraint_annotations(validation: BeanValidation, c: &Constraints) -> Vec<Annotation> {
    let Some(package) = validation.package() else {
        return Vec::new();
    };
    let qualified = |name: &str| format!("{}.{}", package, name);
    let mut out = Vec::new();

    let (min, max) = match (c.min_length, c.max_length) {
        (None, None) => (c.min_items, c.max_items),
        lengths => lengths,
    };
    if min.is_some() || max.is_some() {
        let mut size = Annotation::new(qualified("Size"));
        if let Some(min) = min {
            size = size.param("min", ParameterValue::new(min.to_string()));
        }
        if let Some(max) = max {
            size = size.param("max", ParameterValue::new(max.to_string()));
        }
        out.push(size);
    }

    if let Some(pattern) = &c.pattern {
        out.push(
            Annotation::new(qualified("Pattern"))
                .param("regexp", ParameterValue::new(quote(pattern))),
        );
    }

    if let Some(minimum) = c.minimum {
        out.push(decimal(qualified("DecimalMin"), minimum, c.exclusive_minimum));
    }
    if let Some(maximum) = c.maximum {
        out.push(decimal(qualified("DecimalMax"), maximum, c.exclusive_maximum));
    }

    out
}

fn decimal(type_name: String, bound: f64, exclusive: bool) -> Annotation {
    let mut ann = Annotation::new(type_name).param(
        "value",
        ParameterValue::new(quote(&bound.to_string())),
    );
    if exclusive {
        ann = ann.param("inclusive", ParameterValue::new("false"));
    }
    ann
}

fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}
