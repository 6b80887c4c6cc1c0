use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    pub logical_id: String,
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, resource_type: &str, properties: Value) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type: resource_type.to_string(),
            properties,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Default", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, Parameter>,
    pub resources: Vec<Resource>,
    pub outputs: BTreeMap<String, Value>,
}

impl Stack {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            resources: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, parameter: Parameter) {
        self.parameters.insert(name.into(), parameter);
    }

    pub fn add_output(&mut self, name: impl Into<String>, value: Value) {
        self.outputs.insert(name.into(), json!({ "Value": value }));
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|resource| resource.logical_id == logical_id)
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Resource> {
        self.resources
            .iter()
            .filter(move |resource| resource.resource_type == resource_type)
    }

    /// Renders the stack as a CloudFormation template document.
    pub fn synthesize(&self) -> Result<Value, serde_json::Error> {
        let mut resources = Map::new();
        for resource in &self.resources {
            resources.insert(resource.logical_id.clone(), serde_json::to_value(resource)?);
        }

        let mut template = Map::new();
        template.insert(
            "AWSTemplateFormatVersion".to_string(),
            Value::from(TEMPLATE_FORMAT_VERSION),
        );
        template.insert("Description".to_string(), Value::from(self.description.clone()));
        if !self.parameters.is_empty() {
            template.insert("Parameters".to_string(), serde_json::to_value(&self.parameters)?);
        }
        template.insert("Resources".to_string(), Value::Object(resources));
        if !self.outputs.is_empty() {
            template.insert("Outputs".to_string(), serde_json::to_value(&self.outputs)?);
        }
        Ok(Value::Object(template))
    }
}

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn attribute(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_resources_by_logical_id() {
        let mut stack = Stack::new("demo", "demo stack");
        stack.add(
            Resource::new("Bucket", "AWS::S3::Bucket", json!({})).depends_on("Other"),
        );
        stack.add_output("BucketName", reference("Bucket"));

        let template = stack.synthesize().expect("template should synthesize");

        assert_eq!(template["AWSTemplateFormatVersion"], TEMPLATE_FORMAT_VERSION);
        assert_eq!(template["Resources"]["Bucket"]["Type"], "AWS::S3::Bucket");
        assert_eq!(template["Resources"]["Bucket"]["DependsOn"], json!(["Other"]));
        assert_eq!(template["Outputs"]["BucketName"]["Value"], json!({"Ref": "Bucket"}));
        assert!(template.get("Parameters").is_none());
    }

    #[test]
    fn omits_empty_depends_on() {
        let resource = Resource::new("Queue", "AWS::SQS::Queue", json!({}));
        let value = serde_json::to_value(&resource).expect("resource should serialize");
        assert!(value.get("DependsOn").is_none());
        assert!(value.get("logical_id").is_none());
    }
}
