//! Request body parsing for visit requests. Every problem is recorded
//! against its field before failing.

use serde_json::{Map, Value};

use models::visit_request::{MAX_ADDRESS_LEN, MAX_AVAILABILITY_LEN, MAX_SERVICE_TYPE_LEN};

use super::domain::{VisitRequestDraft, VisitRequestPatch};
use crate::errors::{FieldErrors, ServiceError};

pub const ADDRESS: &str = "direccion";
pub const SERVICE_TYPE: &str = "tipo_servicio";
pub const AVAILABILITY: &str = "disponibilidad_horaria";
pub const AREA: &str = "metros_cuadrados";
pub const LATITUDE: &str = "latitud";
pub const LONGITUDE: &str = "longitud";
pub const GARDENER_ID: &str = "jardinero_id";

/// Server-controlled fields; supplying one is an error on that field.
pub const READ_ONLY_FIELDS: [&str; 6] =
    ["id", "cliente", "jardinero_asignado", "estado", "fecha_creacion", "fecha_visita_confirmada"];

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_INTEGER: &str = "A valid integer is required.";
const NOT_NUMBER: &str = "A valid number is required.";
const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";
const READ_ONLY: &str = "This field is read-only.";

fn object(body: &Value) -> Result<&Map<String, Value>, ServiceError> {
    body.as_object().ok_or_else(|| {
        ServiceError::InvalidFields(FieldErrors::single("non_field_errors", "Invalid data. Expected a dictionary."))
    })
}

fn reject_read_only(obj: &Map<String, Value>, errs: &mut FieldErrors) {
    for field in READ_ONLY_FIELDS {
        if obj.contains_key(field) {
            errs.add(field, READ_ONLY);
        }
    }
}

fn text(obj: &Map<String, Value>, field: &str, max: usize, required: bool, errs: &mut FieldErrors) -> Option<String> {
    match obj.get(field) {
        None if required => {
            errs.add(field, REQUIRED);
            None
        }
        None => None,
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                errs.add(field, BLANK);
                None
            } else if s.chars().count() > max {
                errs.add(field, format!("Ensure this field has no more than {max} characters."));
                None
            } else {
                Some(s.clone())
            }
        }
        Some(Value::Null) => {
            errs.add(field, "This field may not be null.");
            None
        }
        Some(_) => {
            errs.add(field, NOT_STRING);
            None
        }
    }
}

/// JSON integers, integral floats and numeric strings (`"50"`, `"50.0"`).
fn integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e18).then_some(f as i64)
}

/// JSON numbers and finite numeric strings.
fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn area(obj: &Map<String, Value>, required: bool, errs: &mut FieldErrors) -> Option<i32> {
    match obj.get(AREA) {
        None if required => {
            errs.add(AREA, REQUIRED);
            None
        }
        None => None,
        Some(v) => match integer(v) {
            Some(n) if n < 0 => {
                errs.add(AREA, NEGATIVE);
                None
            }
            Some(n) => match i32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => {
                    errs.add(AREA, format!("Ensure this value is less than or equal to {}.", i32::MAX));
                    None
                }
            },
            None => {
                errs.add(AREA, NOT_INTEGER);
                None
            }
        },
    }
}

/// Absent, null, or a number. Outer `None` means absent.
fn coordinate(obj: &Map<String, Value>, field: &str, errs: &mut FieldErrors) -> Option<Option<f64>> {
    match obj.get(field) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(v) => match number(v) {
            Some(f) => Some(Some(f)),
            None => {
                errs.add(field, NOT_NUMBER);
                None
            }
        },
    }
}

/// Body of a create or full update: every required field present.
pub fn parse_draft(body: &Value) -> Result<VisitRequestDraft, ServiceError> {
    let obj = object(body)?;
    let mut errs = FieldErrors::new();
    reject_read_only(obj, &mut errs);
    let address = text(obj, ADDRESS, MAX_ADDRESS_LEN, true, &mut errs);
    let service_type = text(obj, SERVICE_TYPE, MAX_SERVICE_TYPE_LEN, true, &mut errs);
    let availability = text(obj, AVAILABILITY, MAX_AVAILABILITY_LEN, true, &mut errs);
    let area_m2 = area(obj, true, &mut errs);
    let latitude = coordinate(obj, LATITUDE, &mut errs);
    let longitude = coordinate(obj, LONGITUDE, &mut errs);
    match (address, service_type, availability, area_m2) {
        (Some(address), Some(service_type), Some(availability), Some(area_m2)) if errs.is_empty() => {
            Ok(VisitRequestDraft {
                address,
                service_type,
                availability,
                area_m2,
                latitude: latitude.flatten(),
                longitude: longitude.flatten(),
            })
        }
        _ => Err(ServiceError::InvalidFields(errs)),
    }
}

/// Body of a partial update: only supplied fields are checked.
pub fn parse_patch(body: &Value) -> Result<VisitRequestPatch, ServiceError> {
    let obj = object(body)?;
    let mut errs = FieldErrors::new();
    reject_read_only(obj, &mut errs);
    let patch = VisitRequestPatch {
        address: text(obj, ADDRESS, MAX_ADDRESS_LEN, false, &mut errs),
        service_type: text(obj, SERVICE_TYPE, MAX_SERVICE_TYPE_LEN, false, &mut errs),
        availability: text(obj, AVAILABILITY, MAX_AVAILABILITY_LEN, false, &mut errs),
        area_m2: area(obj, false, &mut errs),
        latitude: coordinate(obj, LATITUDE, &mut errs),
        longitude: coordinate(obj, LONGITUDE, &mut errs),
    };
    errs.into_result()?;
    Ok(patch)
}

/// `jardinero_id` of an admin assignment. Existence is checked by the caller.
pub fn parse_assignment(body: &Value) -> Result<i32, ServiceError> {
    let obj = object(body)?;
    let id = match obj.get(GARDENER_ID) {
        None | Some(Value::Null) => return Err(ServiceError::InvalidFields(FieldErrors::single(GARDENER_ID, REQUIRED))),
        Some(v) => integer(v).and_then(|n| i32::try_from(n).ok()),
    };
    id.ok_or_else(|| ServiceError::InvalidFields(FieldErrors::single(GARDENER_ID, NOT_INTEGER)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(err: ServiceError) -> FieldErrors {
        match err {
            ServiceError::InvalidFields(f) => f,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn full_draft_parses() {
        let d = parse_draft(&json!({
            "direccion": "Calle 1",
            "tipo_servicio": "poda",
            "disponibilidad_horaria": "Jueves 9-17",
            "metros_cuadrados": 50,
            "latitud": -33.4,
            "longitud": null
        }))
        .unwrap();
        assert_eq!(d.address, "Calle 1");
        assert_eq!(d.area_m2, 50);
        assert_eq!(d.latitude, Some(-33.4));
        assert_eq!(d.longitude, None);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let f = fields(parse_draft(&json!({"direccion": "  "})).unwrap_err());
        assert_eq!(f.get(ADDRESS).unwrap(), &[BLANK.to_string()]);
        assert!(f.contains(SERVICE_TYPE));
        assert!(f.contains(AVAILABILITY));
        assert!(f.contains(AREA));
    }

    #[test]
    fn read_only_fields_are_rejected_by_name() {
        let f = fields(
            parse_patch(&json!({"estado": "confirmada", "cliente": 3, "jardinero_asignado": 1, "direccion": "x"}))
                .unwrap_err(),
        );
        assert!(f.contains("estado"));
        assert!(f.contains("cliente"));
        assert!(f.contains("jardinero_asignado"));
        assert!(!f.contains(ADDRESS));
    }

    #[test]
    fn area_bounds() {
        let f = fields(parse_patch(&json!({"metros_cuadrados": -1})).unwrap_err());
        assert_eq!(f.get(AREA).unwrap(), &[NEGATIVE.to_string()]);
        assert!(parse_patch(&json!({"metros_cuadrados": 3_000_000_000i64})).is_err());
        assert!(parse_patch(&json!({"metros_cuadrados": 1.5})).is_err());
        assert_eq!(parse_patch(&json!({"metros_cuadrados": 0})).unwrap().area_m2, Some(0));
    }

    #[test]
    fn numeric_strings_and_integral_floats() {
        assert_eq!(parse_patch(&json!({"metros_cuadrados": "50"})).unwrap().area_m2, Some(50));
        assert_eq!(parse_patch(&json!({"metros_cuadrados": 50.0})).unwrap().area_m2, Some(50));
        assert_eq!(parse_patch(&json!({"metros_cuadrados": " 12.0 "})).unwrap().area_m2, Some(12));
        assert!(parse_patch(&json!({"metros_cuadrados": "12.5"})).is_err());
        assert!(parse_patch(&json!({"metros_cuadrados": "-3"})).is_err());

        let p = parse_patch(&json!({"latitud": "-33.45", "longitud": "70"})).unwrap();
        assert_eq!(p.latitude, Some(Some(-33.45)));
        assert_eq!(p.longitude, Some(Some(70.0)));
        assert!(parse_patch(&json!({"latitud": "NaN"})).is_err());
        assert_eq!(parse_assignment(&json!({"jardinero_id": 4.0})).unwrap(), 4);
    }

    #[test]
    fn too_long_address() {
        let long = "a".repeat(MAX_ADDRESS_LEN + 1);
        assert!(fields(parse_patch(&json!({ "direccion": long })).unwrap_err()).contains(ADDRESS));
    }

    #[test]
    fn patch_can_clear_coordinates() {
        let p = parse_patch(&json!({"latitud": null, "longitud": 12.5})).unwrap();
        assert_eq!(p.latitude, Some(None));
        assert_eq!(p.longitude, Some(Some(12.5)));
        assert!(p.address.is_none());
        assert!(parse_patch(&json!({"latitud": "north"})).is_err());
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(parse_patch(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn non_object_body() {
        assert!(fields(parse_draft(&json!([1, 2])).unwrap_err()).contains("non_field_errors"));
    }

    #[test]
    fn assignment_id_forms() {
        assert_eq!(parse_assignment(&json!({"jardinero_id": 4})).unwrap(), 4);
        assert_eq!(parse_assignment(&json!({"jardinero_id": "7"})).unwrap(), 7);
        assert!(fields(parse_assignment(&json!({})).unwrap_err()).contains(GARDENER_ID));
        assert!(fields(parse_assignment(&json!({"jardinero_id": "abc"})).unwrap_err()).contains(GARDENER_ID));
        assert!(fields(parse_assignment(&json!({"jardinero_id": 2.5})).unwrap_err()).contains(GARDENER_ID));
    }
}
