//! Value coercion shared by the set editor and the multi-value handler.
//!
//! Scalars and arrays are both treated as collections of scalars of one base
//! type; the result is always written back as an array.

use std::collections::BTreeSet;

use super::errors::{CRDTError, type_label};
use crate::tree::{PropertyState, PropertyValue, Scalar, ScalarType};

/// Fail unless `property` has base type `expected`.
pub(crate) fn ensure_type(property: &PropertyState, expected: ScalarType) -> Result<(), CRDTError> {
    if property.scalar_type() == expected {
        Ok(())
    } else {
        Err(CRDTError::mismatch(
            property.name(),
            expected.to_string(),
            property.value(),
        ))
    }
}

/// Fail unless `property` has the same base type as `existing`.
pub(crate) fn ensure_same_type(
    property: &PropertyState,
    existing: &PropertyState,
) -> Result<(), CRDTError> {
    if property.scalar_type() == existing.scalar_type() {
        Ok(())
    } else {
        Err(CRDTError::mismatch(
            property.name(),
            type_label(existing.value()),
            property.value(),
        ))
    }
}

/// Distinct scalars of all `properties`, which must all have type `base`.
pub(crate) fn union<'a>(
    base: ScalarType,
    properties: impl IntoIterator<Item = &'a PropertyState>,
) -> Result<BTreeSet<Scalar>, CRDTError> {
    let mut values = BTreeSet::new();
    for property in properties {
        ensure_type(property, base)?;
        values.extend(property.value().values().iter().cloned());
    }
    Ok(values)
}

/// Array property `name` holding `values`.
pub(crate) fn array_property(
    name: &str,
    base: ScalarType,
    values: BTreeSet<Scalar>,
) -> crate::Result<PropertyState> {
    let value = PropertyValue::array(base, values)?;
    Ok(PropertyState::new(name, value))
}
