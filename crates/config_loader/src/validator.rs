//! 配置校验模块
//!
//! 校验规则：
//! - pipeline.name 非空且可作为命名空间
//! - 类别不重复 (每个类别至多一个通道)
//! - queue_capacity > 0
//! - topic 覆盖必须为绝对路径 (以 '/' 开头)

use std::collections::HashSet;

use contracts::{ContractError, PublicationBlueprint};

/// 校验 PublicationBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PublicationBlueprint) -> Result<(), ContractError> {
    validate_pipeline_name(blueprint)?;
    validate_unique_categories(blueprint)?;
    validate_capacities(blueprint)?;
    validate_topics(blueprint)?;
    Ok(())
}

/// 校验流水线名称
fn validate_pipeline_name(blueprint: &PublicationBlueprint) -> Result<(), ContractError> {
    let name = &blueprint.pipeline.name;
    if name.is_empty() {
        return Err(ContractError::config_validation(
            "pipeline.name",
            "pipeline name cannot be empty",
        ));
    }

    // Name becomes a topic segment
    if name.contains('/') || name.contains(char::is_whitespace) {
        return Err(ContractError::config_validation(
            "pipeline.name",
            format!("pipeline name '{name}' must not contain '/' or whitespace"),
        ));
    }
    Ok(())
}

/// 校验类别唯一性
fn validate_unique_categories(blueprint: &PublicationBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for channel in &blueprint.channels {
        if !seen.insert(channel.category) {
            return Err(ContractError::config_validation(
                format!("channels[category={}]", channel.category),
                "duplicate category",
            ));
        }
    }
    Ok(())
}

/// 校验队列容量
fn validate_capacities(blueprint: &PublicationBlueprint) -> Result<(), ContractError> {
    for channel in &blueprint.channels {
        if channel.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("channels[{}].queue_capacity", channel.category),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

/// 校验主题覆盖
fn validate_topics(blueprint: &PublicationBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for channel in &blueprint.channels {
        let topic = blueprint.topic_for(channel);
        if !topic.starts_with('/') {
            return Err(ContractError::config_validation(
                format!("channels[{}].topic", channel.category),
                format!("topic '{topic}' must start with '/'"),
            ));
        }
        if !seen.insert(topic.clone()) {
            return Err(ContractError::config_validation(
                format!("channels[{}].topic", channel.category),
                format!("duplicate topic '{topic}'"),
            ));
        }
    }
    Ok(())
}
