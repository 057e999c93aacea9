use turnstile_core::{
    ExecutorBinding, FlowType, Graph, InputField, InputType, Node, NodeId, NodeKind,
};
use crate::document::{node_types, GraphDocument, InputDocument, NodeDocument};
use crate::error::DslError;

/// Build the core graph from a document that already passed validation
pub fn into_graph(document: GraphDocument) -> Result<Graph, DslError> {
    let flow_type = match document.graph_type.as_str() {
        "AUTHENTICATION" => FlowType::Authentication,
        "REGISTRATION" => FlowType::Registration,
        other => return Err(unexpected("graph type", other)),
    };

    let nodes = document
        .nodes
        .into_iter()
        .map(into_node)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Graph::new(document.id, flow_type, nodes))
}

fn into_node(node: NodeDocument) -> Result<Node, DslError> {
    let kind = match node.node_type.as_str() {
        node_types::DECISION => NodeKind::Decision,
        node_types::PROMPT_ONLY => NodeKind::PromptOnly,
        node_types::TASK_EXECUTION => {
            let executor = node
                .executor
                .ok_or_else(|| unexpected("task node without executor", &node.id))?;
            NodeKind::TaskExecution(ExecutorBinding {
                name: executor.name,
                idp_name: executor.idp_name,
                properties: executor.properties,
            })
        }
        node_types::AUTHENTICATION_SUCCESS => NodeKind::AuthenticationSuccess,
        node_types::AUTHENTICATION_FAILURE => NodeKind::AuthenticationFailure,
        other => return Err(unexpected("node type", other)),
    };

    let inputs = node
        .input_data
        .into_iter()
        .map(into_input)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node {
        id: NodeId(node.id),
        kind,
        inputs,
        next: node.next.into_iter().map(NodeId).collect(),
        start: node.start,
    })
}

fn into_input(input: InputDocument) -> Result<InputField, DslError> {
    let input_type = match input.input_type.as_str() {
        "string" => InputType::String,
        "number" => InputType::Number,
        "boolean" => InputType::Boolean,
        other => return Err(unexpected("input type", other)),
    };
    Ok(InputField::new(input.name, input_type, input.required))
}

fn unexpected(what: &str, value: &str) -> DslError {
    DslError::InternalError(format!("unvalidated {} '{}' reached conversion", what, value))
}
