// This file is part of the terraform-provider-forwardnetworks project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueBool, ValueList, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics, schema::Schema};

use crate::utils::{
    answered_string, attribute, list_of, non_empty, string_value, WithNormalize, WithSchema,
};

use super::{Check, CheckDefinition, CheckFilter, NewCheck};

/// `forwardnetworks_check`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub check_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub snapshot_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub check_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub query_id: ValueString<'a>,
    pub enabled: ValueBool,
}

impl<'a> WithSchema for CheckState<'a> {
    fn schema() -> Schema {
        let computed = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };
        let required = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                description,
            )
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a check of a snapshot."),
                attributes: map! {
                    "id" => computed("Identifier of the check."),
                    "check_id" => computed("The ID of the check."),
                    "snapshot_id" => required("The ID of the snapshot to which the check belongs."),
                    "check_type" => required("The type of the check."),
                    "query_id" => required("The query ID of the check."),
                    "enabled" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the check is enabled or not. Defaults to true.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithNormalize for CheckState<'a> {
    fn normalize(&mut self, _diags: &mut Diagnostics) {
        if self.enabled.is_null() {
            self.enabled = Value::Value(true);
        }
    }
}

impl<'a> CheckState<'a> {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn to_request(&self) -> NewCheck {
        NewCheck {
            definition: CheckDefinition {
                check_type: self.check_type.as_str().to_owned(),
                query_id: non_empty(&self.query_id).unwrap_or_default(),
                ..Default::default()
            },
            enabled: self.enabled(),
        }
    }

    /// Activation request, `None` for a check created disabled
    pub fn activation(&self) -> Option<NewCheck> {
        self.enabled().then(|| self.to_request())
    }

    /// A check that was never activated has no ID
    pub fn set_inactive(&mut self) {
        self.id = Value::Null;
        self.check_id = Value::Null;
    }

    /// ID of the check to deactivate when the resource is destroyed
    pub fn active_check(&self) -> Option<String> {
        if self.enabled() {
            non_empty(&self.id)
        } else {
            None
        }
    }

    pub fn apply(&mut self, check: Check) {
        if !check.id.is_empty() {
            self.id = string_value(check.id.clone());
            self.check_id = string_value(check.id);
        }
        self.check_type = string_value(check.definition.check_type);
        self.query_id = answered_string(&self.query_id, check.definition.query_id);
        self.enabled = Value::Value(check.enabled);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEntry<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub predefined_check_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub check_type: ValueString<'a>,
    pub enabled: ValueBool,
    #[serde(borrow = "'a")]
    pub priority: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    pub creation_date_millis: ValueNumber,
    #[serde(borrow = "'a")]
    pub creator_id: ValueString<'a>,
    pub definition_date_millis: ValueNumber,
    #[serde(borrow = "'a")]
    pub description: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub status: ValueString<'a>,
    pub execution_date_millis: ValueNumber,
    pub execution_duration_millis: ValueNumber,
}

impl<'a> From<Check> for CheckEntry<'a> {
    fn from(check: Check) -> Self {
        Self {
            id: string_value(check.id),
            predefined_check_type: string_value(check.definition.predefined_check_type),
            check_type: string_value(check.definition.check_type),
            enabled: Value::Value(check.enabled),
            priority: string_value(check.priority),
            name: string_value(check.name),
            creation_date_millis: Value::Value(check.creation_date_millis),
            creator_id: string_value(check.creator_id),
            definition_date_millis: Value::Value(check.definition_date_millis),
            description: string_value(check.description),
            status: string_value(check.status),
            execution_date_millis: Value::Value(check.execution_date_millis),
            execution_duration_millis: Value::Value(check.execution_duration_millis),
        }
    }
}

/// `forwardnetworks_checks`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksState<'a> {
    #[serde(borrow = "'a")]
    pub snapshot_id: ValueString<'a>,
    #[serde(borrow = "'a", rename = "type")]
    pub check_type: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub priority: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub status: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub check_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub checks: ValueList<Value<CheckEntry<'a>>>,
}

impl<'a> WithSchema for ChecksState<'a> {
    fn schema() -> Schema {
        let filter = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Optional,
                description,
            )
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Checks of a snapshot"),
                attributes: map! {
                    "snapshot_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "The ID of the snapshot.",
                    ),
                    "type" => filter("Only return checks of this type."),
                    "priority" => filter("Only return checks of this priority."),
                    "status" => filter("Only return checks with this status."),
                    "check_id" => filter("Only return the check with this ID. It must exist."),
                    "checks" => attribute(
                        list_of(AttributeType::Object(map! {
                            "id" => AttributeType::String,
                            "predefined_check_type" => AttributeType::String,
                            "check_type" => AttributeType::String,
                            "enabled" => AttributeType::Bool,
                            "priority" => AttributeType::String,
                            "name" => AttributeType::String,
                            "creation_date_millis" => AttributeType::Number,
                            "creator_id" => AttributeType::String,
                            "definition_date_millis" => AttributeType::Number,
                            "description" => AttributeType::String,
                            "status" => AttributeType::String,
                            "execution_date_millis" => AttributeType::Number,
                            "execution_duration_millis" => AttributeType::Number,
                        })),
                        AttributeConstraint::Computed,
                        "The checks.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> ChecksState<'a> {
    pub fn filter(&self) -> CheckFilter {
        CheckFilter {
            check_type: non_empty(&self.check_type),
            priority: non_empty(&self.priority),
            status: non_empty(&self.status),
        }
    }

    /// Store the checks, restricted to `check_id` when set.
    ///
    /// Returns the requested ID when no check has it.
    pub fn set_checks(&mut self, checks: Vec<Check>) -> Result<(), String> {
        let checks = match non_empty(&self.check_id) {
            Some(check_id) => {
                let check = checks
                    .into_iter()
                    .find(|check| check.id == check_id)
                    .ok_or(check_id)?;
                vec![check]
            }
            None => checks,
        };

        self.checks = Value::Value(
            checks
                .into_iter()
                .map(|check| Value::Value(check.into()))
                .collect(),
        );
        Ok(())
    }
}
