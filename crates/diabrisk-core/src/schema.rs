/// Feature columns of the diabetes risk model.
pub mod features {
    use arrow::datatypes::{DataType, Field, Schema};

    pub const AGE: &str = "age";
    pub const BMI: &str = "bmi";
    pub const HBA1C_LEVEL: &str = "HbA1c_level";
    pub const BLOOD_GLUCOSE_LEVEL: &str = "blood_glucose_level";
    pub const SMOKING_HISTORY: &str = "smoking_history";
    pub const IS_MALE: &str = "is_male";
    pub const HYPERTENSION: &str = "hypertension";
    pub const HEART_DISEASE: &str = "heart_disease";

    /// Every column the model was trained on, in training order.
    pub const ALL: [&str; 8] = [
        AGE,
        BMI,
        HBA1C_LEVEL,
        BLOOD_GLUCOSE_LEVEL,
        SMOKING_HISTORY,
        IS_MALE,
        HYPERTENSION,
        HEART_DISEASE,
    ];

    /// Schema of a fully-populated record, columns sorted by name.
    ///
    /// This is what [`FeatureRecord::to_record_batch`](crate::FeatureRecord::to_record_batch)
    /// produces for a record carrying exactly the training columns.
    pub fn diabetes_schema() -> Schema {
        let mut fields: Vec<Field> = ALL
            .iter()
            .map(|&name| {
                let ty = if name == SMOKING_HISTORY {
                    DataType::Utf8
                } else {
                    DataType::Float64
                };
                Field::new(name, ty, false)
            })
            .collect();
        fields.sort_by(|a, b| a.name().cmp(b.name()));
        Schema::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::features;

    #[test]
    fn diabetes_schema_has_expected_fields() {
        let schema = features::diabetes_schema();
        assert_eq!(schema.fields().len(), 8);
        assert!(schema.field_with_name("HbA1c_level").is_ok());
        assert!(schema.field_with_name("smoking_history").is_ok());
    }

    #[test]
    fn smoking_history_is_the_only_text_column() {
        let schema = features::diabetes_schema();
        let text: Vec<&str> = schema
            .fields()
            .iter()
            .filter(|f| f.data_type() == &arrow::datatypes::DataType::Utf8)
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(text, vec![features::SMOKING_HISTORY]);
    }
}
