pub use crate::config::*;

/// A builder for adding survey responses one at a time.
///
/// ```
/// use course_ranking::builder::Builder;
/// # use course_ranking::RankingErrors;
///
/// let mut builder = Builder::new(&["Taxation".to_string(), "Audit".to_string()])?;
///
/// builder.add_response_text(&["1", "2"])?;
/// builder.add_response_text(&["2", "N/A"])?;
///
/// let table = builder.ranking()?;
/// assert_eq!(table.rows[0].course, "Taxation");
/// assert_eq!(table.cleaning.final_rows, 1);
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _schema: ResponseSchema,
    pub(crate) _rows: Vec<ResponseRow>,
}

impl Builder {
    /// Starts a builder for the given course names, in column order.
    pub fn new(courses: &[String]) -> Result<Builder, RankingErrors> {
        let columns = courses
            .iter()
            .enumerate()
            .map(|(index, name)| CourseColumn {
                index,
                name: name.clone(),
            })
            .collect();
        Builder::with_schema(ResponseSchema::new(columns)?)
    }

    pub fn with_schema(schema: ResponseSchema) -> Result<Builder, RankingErrors> {
        Ok(Builder {
            _schema: schema,
            _rows: Vec::new(),
        })
    }

    /// Adds a response whose values have already been read as numbers.
    pub fn add_response(&mut self, values: &[Option<f64>]) -> Result<(), RankingErrors> {
        if values.len() != self._schema.len() {
            return Err(RankingErrors::RowWidth {
                expected: self._schema.len(),
                found: values.len(),
            });
        }
        self._rows.push(values.to_vec());
        Ok(())
    }

    /// Adds a response given as raw text, one entry per course.
    /// Entries that are not numbers count as missing.
    pub fn add_response_text(&mut self, values: &[&str]) -> Result<(), RankingErrors> {
        let parsed: Vec<Option<f64>> = values.iter().map(|s| crate::parse_numeric(s)).collect();
        self.add_response(&parsed)
    }

    pub fn schema(&self) -> &ResponseSchema {
        &self._schema
    }

    pub fn num_responses(&self) -> usize {
        self._rows.len()
    }

    pub fn ranking(&self) -> Result<RankingTable, RankingErrors> {
        crate::run_ranking(&self._schema, &self._rows)
    }
}
