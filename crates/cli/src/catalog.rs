//! Built-in demo component catalog.
//!
//! Registers a handful of page components with a default implementation and
//! a few theme overrides so the CLI has something to resolve.

use std::sync::Arc;

use anyhow::Result;
use thematic_registry::{ComponentRegistry, MissingLoader, PropertyModule, ready};
use thematic_types::BindingDescriptor;

const COMCOL_PAGE_CONTENT: &str = "ComcolPageContentComponent";
const SUBMISSION_FORM: &str = "SubmissionFormComponent";
const BROWSE_BY_TITLE_PAGE: &str = "BrowseByTitlePageComponent";
const METADATA_IMPORT_PAGE: &str = "MetadataImportPageComponent";

const COMCOL_INPUTS: [&str; 3] = ["title", "content", "hasInnerHtml"];
const SUBMISSION_INPUTS: [&str; 8] = [
    "collectionId",
    "item",
    "collectionModifiable",
    "sections",
    "submissionErrors",
    "selfUrl",
    "submissionDefinition",
    "submissionId",
];

/// Build the demo registry.
pub fn demo_registry() -> Result<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();

    registry
        .register(
            COMCOL_PAGE_CONTENT,
            BindingDescriptor::inputs(COMCOL_INPUTS)?,
            ready(property(COMCOL_PAGE_CONTENT, &COMCOL_INPUTS)),
        )?
        .register_override(
            COMCOL_PAGE_CONTENT,
            "dspace",
            ready(property(&format!("dspace/{COMCOL_PAGE_CONTENT}"), &COMCOL_INPUTS)),
        )?
        .register_override(
            COMCOL_PAGE_CONTENT,
            "custom",
            ready(property(&format!("custom/{COMCOL_PAGE_CONTENT}"), &COMCOL_INPUTS)),
        )?;

    let mut submission_bindings = BindingDescriptor::builder();
    for name in SUBMISSION_INPUTS {
        submission_bindings = submission_bindings.input(name);
    }
    registry
        .register(
            SUBMISSION_FORM,
            submission_bindings.output("changed").build()?,
            ready(property(SUBMISSION_FORM, &SUBMISSION_INPUTS).announcing_changes_on("changed")),
        )?
        .register_override(
            SUBMISSION_FORM,
            "custom",
            ready(property(&format!("custom/{SUBMISSION_FORM}"), &SUBMISSION_INPUTS).announcing_changes_on("changed")),
        )?;

    registry
        .register(BROWSE_BY_TITLE_PAGE, BindingDescriptor::empty(), ready(PropertyModule::new(BROWSE_BY_TITLE_PAGE)))?
        .register_override(
            BROWSE_BY_TITLE_PAGE,
            "custom",
            Arc::new(MissingLoader::new(format!("custom/{BROWSE_BY_TITLE_PAGE}"))),
        )?;

    registry.register(METADATA_IMPORT_PAGE, BindingDescriptor::empty(), ready(PropertyModule::new(METADATA_IMPORT_PAGE)))?;

    Ok(registry)
}

fn property(name: &str, inputs: &[&str]) -> PropertyModule {
    PropertyModule::new(name).with_inputs(inputs.iter().copied())
}
