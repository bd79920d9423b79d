//! Stored-procedure parameters and terminals.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Statement;
use super::states::{
    OutputParameterClause, ParameterClause, StoredProcedure, StoredProcedureOutput,
    StoredProcedureParameters,
};
use crate::error::FluentSqlError;
use crate::params::Parameters;
use crate::procedure::{OutputParameter, ProcedureCall, StoredProcedureWithOutputResult};
use crate::results::CustomDbRow;
use crate::types::RowValues;

impl<S> Statement<'_, S> {
    fn call_mut(&mut self) -> &mut ProcedureCall {
        self.session
            .procedure
            .get_or_insert_with(ProcedureCall::default)
    }
}

impl<'s, S: ParameterClause> Statement<'s, S> {
    /// Bind one input parameter; `name` may carry the leading `@` or not.
    pub fn with_parameter(
        mut self,
        name: &str,
        value: impl Into<RowValues>,
    ) -> Statement<'s, StoredProcedureParameters> {
        self.call_mut().parameters.bind(name, value);
        self.advance()
    }

    pub fn with_parameters(
        mut self,
        params: impl Into<Parameters>,
    ) -> Statement<'s, StoredProcedureParameters> {
        self.call_mut().parameters.merge(params.into());
        self.advance()
    }

    /// Bind every field of `value` as an input parameter named after the field.
    ///
    /// # Errors
    /// Returns an error if `value` does not serialize to a map of named fields.
    pub fn with_parameters_from<T: Serialize + ?Sized>(
        mut self,
        value: &T,
    ) -> Result<Statement<'s, StoredProcedureParameters>, FluentSqlError> {
        let params = Parameters::from_serialize(value)?;
        self.call_mut().parameters.merge(params);
        Ok(self.advance())
    }
}

impl<'s, S: OutputParameterClause> Statement<'s, S> {
    /// Declare an output parameter. From here on the terminals also return output values.
    pub fn with_output_parameter(
        mut self,
        parameter: OutputParameter,
    ) -> Statement<'s, StoredProcedureOutput> {
        self.call_mut().output_parameters.push(parameter);
        self.advance()
    }

    pub fn with_output_parameters(
        mut self,
        parameters: impl IntoIterator<Item = OutputParameter>,
    ) -> Statement<'s, StoredProcedureOutput> {
        self.call_mut().output_parameters.extend(parameters);
        self.advance()
    }
}

macro_rules! impl_procedure_terminals {
    ($($state:ty),+) => {
        $(
            impl Statement<'_, $state> {
                /// Name of the procedure being called.
                #[must_use]
                pub fn name(&self) -> &str {
                    self.session.name().unwrap_or_default()
                }

                /// Run the procedure and return the affected-row count.
                pub async fn execute_non_query(self) -> Result<usize, FluentSqlError> {
                    let (rows, _) = self.into_session().execute_procedure().await?;
                    Ok(rows)
                }

                pub async fn execute_to_dynamic(self) -> Result<Vec<CustomDbRow>, FluentSqlError> {
                    let (result_set, _) = self.into_session().query_procedure().await?;
                    Ok(result_set.results)
                }

                /// First row the procedure returns, or `None`.
                pub async fn execute_to_dynamic_single(
                    self,
                ) -> Result<Option<CustomDbRow>, FluentSqlError> {
                    let (result_set, _) = self.into_session().query_procedure().await?;
                    Ok(result_set.into_first())
                }

                pub async fn execute_to_mapped_object<T: DeserializeOwned>(
                    self,
                ) -> Result<Vec<T>, FluentSqlError> {
                    let (result_set, _) = self.into_session().query_procedure().await?;
                    result_set.deserialize()
                }

                pub async fn execute_to_mapped_object_single<T: DeserializeOwned>(
                    self,
                ) -> Result<Option<T>, FluentSqlError> {
                    let (result_set, _) = self.into_session().query_procedure().await?;
                    result_set.into_first().map(|row| row.deserialize()).transpose()
                }
            }
        )+
    };
}

impl_procedure_terminals!(StoredProcedure, StoredProcedureParameters);

impl Statement<'_, StoredProcedureOutput> {
    #[must_use]
    pub fn name(&self) -> &str {
        self.session.name().unwrap_or_default()
    }

    /// Declared output parameters, in declaration order.
    #[must_use]
    pub fn output_parameters(&self) -> &[OutputParameter] {
        self.session
            .procedure
            .as_ref()
            .map(|call| call.output_parameters.as_slice())
            .unwrap_or_default()
    }

    pub async fn execute_non_query(
        self,
    ) -> Result<StoredProcedureWithOutputResult<usize>, FluentSqlError> {
        let (rows, outputs) = self.into_session().execute_procedure().await?;
        Ok(StoredProcedureWithOutputResult::new(rows, outputs))
    }

    pub async fn execute_to_dynamic(
        self,
    ) -> Result<StoredProcedureWithOutputResult<Vec<CustomDbRow>>, FluentSqlError> {
        let (result_set, outputs) = self.into_session().query_procedure().await?;
        Ok(StoredProcedureWithOutputResult::new(result_set.results, outputs))
    }

    pub async fn execute_to_dynamic_single(
        self,
    ) -> Result<StoredProcedureWithOutputResult<Option<CustomDbRow>>, FluentSqlError> {
        let (result_set, outputs) = self.into_session().query_procedure().await?;
        Ok(StoredProcedureWithOutputResult::new(result_set.into_first(), outputs))
    }

    pub async fn execute_to_mapped_object<T: DeserializeOwned>(
        self,
    ) -> Result<StoredProcedureWithOutputResult<Vec<T>>, FluentSqlError> {
        let (result_set, outputs) = self.into_session().query_procedure().await?;
        Ok(StoredProcedureWithOutputResult::new(result_set.deserialize()?, outputs))
    }

    pub async fn execute_to_mapped_object_single<T: DeserializeOwned>(
        self,
    ) -> Result<StoredProcedureWithOutputResult<Option<T>>, FluentSqlError> {
        let (result_set, outputs) = self.into_session().query_procedure().await?;
        let value = result_set
            .into_first()
            .map(|row| row.deserialize())
            .transpose()?;
        Ok(StoredProcedureWithOutputResult::new(value, outputs))
    }
}
