use super::types::ReadError;
use netcdf::AttributeValue;
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::path::Path;

pub fn is_supported_file_type(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("nc") | Some("nc4") | Some("netcdf")
    )
}

pub fn check_readable(path: &Path) -> Result<(), ReadError> {
    if !is_supported_file_type(path) {
        return Err(ReadError::UnsupportedFileType(path.to_path_buf()));
    }
    if !path.exists() {
        return Err(ReadError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

pub fn attribute_to_string(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Strs(s) => s.join(", "),
        AttributeValue::Double(v) => v.to_string(),
        AttributeValue::Float(v) => v.to_string(),
        AttributeValue::Int(v) => v.to_string(),
        AttributeValue::Longlong(v) => v.to_string(),
        AttributeValue::Short(v) => v.to_string(),
        other => format!("{:?}", other),
    }
}

/// Numeric storage type as printed in dataset summaries, e.g. `float64`.
pub fn dtype_name(vartype: &NcVariableType) -> String {
    match vartype {
        NcVariableType::Float(FloatType::F64) => "float64".to_string(),
        NcVariableType::Float(FloatType::F32) => "float32".to_string(),
        NcVariableType::Int(IntType::I64) => "int64".to_string(),
        NcVariableType::Int(IntType::I32) => "int32".to_string(),
        NcVariableType::Int(IntType::I16) => "int16".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Reads `extents` of a numeric variable as f64, whatever its storage type.
pub fn read_f64<E>(var: &netcdf::Variable<'_>, extents: E) -> Result<Vec<f64>, ReadError>
where
    E: TryInto<netcdf::Extents>,
    E::Error: Into<netcdf::Error>,
{
    let values = match var.vartype() {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(extents)?,
        NcVariableType::Float(FloatType::F32) => var
            .get_values::<f32, _>(extents)?
            .into_iter()
            .map(f64::from)
            .collect(),
        NcVariableType::Int(IntType::I64) => var
            .get_values::<i64, _>(extents)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        NcVariableType::Int(IntType::I32) => var
            .get_values::<i32, _>(extents)?
            .into_iter()
            .map(f64::from)
            .collect(),
        NcVariableType::Int(IntType::I16) => var
            .get_values::<i16, _>(extents)?
            .into_iter()
            .map(f64::from)
            .collect(),
        other => {
            return Err(ReadError::UnsupportedType {
                variable: var.name(),
                dtype: dtype_name(&other),
            });
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_types() {
        assert!(is_supported_file_type(Path::new("sst_data.nc")));
        assert!(is_supported_file_type(Path::new("/tmp/a.nc4")));
        assert!(!is_supported_file_type(Path::new("sst.tif")));
        assert!(!is_supported_file_type(Path::new("sst")));
    }

    #[test]
    fn test_check_readable() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            check_readable(&dir.path().join("missing.nc")),
            Err(ReadError::NotFound(_))
        ));
        assert!(matches!(
            check_readable(&dir.path().join("data.zarr")),
            Err(ReadError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_attribute_to_string() {
        assert_eq!(attribute_to_string(&AttributeValue::Str("degC".into())), "degC");
        assert_eq!(attribute_to_string(&AttributeValue::Double(1.5)), "1.5");
    }
}
