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
use tf_provider::value::{Value, ValueNumber, ValueString};
use tf_provider::{map, schema::Schema};

use crate::utils::{
    answered_string, attribute, non_empty, optional_string, string_value, WithSchema,
};

use super::{Network, NetworkUpdate};

/// `forwardnetworks_network`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub name: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub note: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub org_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub parent_id: ValueString<'a>,
    #[serde(borrow = "'a")]
    pub creator: ValueString<'a>,
    pub created_at: ValueNumber,
}

impl<'a> WithSchema for NetworkState<'a> {
    fn schema() -> Schema {
        let computed = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };

        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a network."),
                attributes: map! {
                    "id" => computed("Identifier of the network."),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the network.",
                    ),
                    "note" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Note for the network.",
                    ),
                    "org_id" => computed("Organization owning the network."),
                    "parent_id" => computed("Parent network, for workspace networks."),
                    "creator" => computed("User who created the network."),
                    "created_at" => attribute(
                        AttributeType::Number,
                        AttributeConstraint::Computed,
                        "Creation time of the network, in milliseconds since the epoch.",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> NetworkState<'a> {
    /// Computed attributes are only known once the network exists
    pub fn mark_computed_unknown(&mut self) {
        self.id = Value::Unknown;
        self.org_id = Value::Unknown;
        self.parent_id = Value::Unknown;
        self.creator = Value::Unknown;
        self.created_at = Value::Unknown;
    }

    pub fn update_request(&self) -> NetworkUpdate {
        NetworkUpdate {
            name: non_empty(&self.name).unwrap_or_default(),
            note: non_empty(&self.note).unwrap_or_default(),
        }
    }

    /// Project the API view of the network into the state
    pub fn apply(&mut self, network: Network) {
        self.id = string_value(network.id);
        self.name = string_value(network.name);
        self.note = answered_string(&self.note, network.note);
        self.org_id = optional_string(Some(network.org_id));
        self.parent_id = optional_string(Some(network.parent_id));
        self.creator = optional_string(Some(network.creator));
        self.created_at = Value::Value(network.created_at);
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn state_to_request_to_state() {
        let planned = NetworkState {
            name: Value::Value(Cow::Borrowed("lab")),
            note: Value::Value(Cow::Borrowed("managed by terraform")),
            ..Default::default()
        };

        let request = planned.update_request();
        assert_eq!(request.name, "lab");
        assert_eq!(request.note, "managed by terraform");

        let mut state = planned.clone();
        state.mark_computed_unknown();
        state.apply(Network {
            id: "net-1".into(),
            name: request.name,
            org_id: "org-1".into(),
            created_at: 42,
            note: request.note,
            ..Default::default()
        });

        assert_eq!(state.id.as_str(), "net-1");
        assert_eq!(state.name, planned.name);
        assert_eq!(state.note, planned.note);
        assert_eq!(state.org_id.as_str(), "org-1");
        assert!(state.parent_id.is_null());
        assert!(state.creator.is_null());
        assert_eq!(state.created_at, Value::Value(42));
    }

    #[test]
    fn empty_note_keeps_configuration() {
        let mut state = NetworkState {
            note: Value::Value(Cow::Borrowed("")),
            ..Default::default()
        };
        state.apply(Network {
            id: "net-1".into(),
            name: "lab".into(),
            ..Default::default()
        });
        assert_eq!(state.note.as_str(), "");

        let mut state = NetworkState::default();
        state.apply(Network {
            id: "net-1".into(),
            name: "lab".into(),
            ..Default::default()
        });
        assert!(state.note.is_null());
    }
}
