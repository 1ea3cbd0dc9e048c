//! Draft transitions.
//!
//! Every transition consumes the draft and returns the next one, so the
//! variable and button lists can never drift apart from counters kept
//! elsewhere.

use super::substitution::{append_variable, remove_variable};
use super::types::{
    Button, Category, Header, HeaderFormat, TemplateDraft, TemplateError, TemplateResult,
    TemplateSection, Variable,
};
use super::validation::{MAX_BUTTONS, MAX_HEADER_VARIABLES};

impl TemplateDraft {
    /// A fresh draft with an empty body and no header.
    pub fn new(name: impl Into<String>, language: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            category,
            header: Header::none(),
            body: String::new(),
            footer: None,
            buttons: Vec::new(),
            header_variables: Vec::new(),
            body_variables: Vec::new(),
            expire_seconds: None,
            authentication: Default::default(),
        }
    }

    /// Replace the header. Switching away from a text header drops its
    /// variables.
    pub fn with_header(mut self, header: Header) -> Self {
        if header.format != HeaderFormat::Text {
            self.header_variables.clear();
        }
        self.header = header;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer.filter(|f| !f.is_empty());
        self
    }

    pub fn with_expire_seconds(mut self, seconds: Option<u32>) -> Self {
        self.expire_seconds = seconds;
        self
    }

    /// Append a button, enforcing per-kind and total limits.
    ///
    /// Duplicate labels are accepted here and reported by validation.
    pub fn add_button(mut self, button: Button) -> TemplateResult<Self> {
        let kind = button.kind();
        if let Some(max) = kind.limit() {
            if self.button_count(kind) >= max {
                return Err(TemplateError::ButtonLimit { kind, max });
            }
        }
        if self.buttons.len() >= MAX_BUTTONS {
            return Err(TemplateError::InvalidTemplate(format!(
                "A template can have at most {} buttons",
                MAX_BUTTONS
            )));
        }

        self.buttons.push(button);
        Ok(self)
    }

    /// Remove the button at `position` (0-based).
    pub fn remove_button(mut self, position: usize) -> TemplateResult<Self> {
        if position >= self.buttons.len() {
            return Err(TemplateError::ButtonNotFound(position));
        }
        self.buttons.remove(position);
        Ok(self)
    }

    /// Bind a new variable and append its token to the section text.
    pub fn add_variable(
        mut self,
        section: TemplateSection,
        object: &str,
        field: &str,
        alternate_text: Option<String>,
    ) -> TemplateResult<Self> {
        if section == TemplateSection::Header {
            if self.header.format != HeaderFormat::Text {
                return Err(TemplateError::InvalidTemplate(format!(
                    "{} header cannot have variables",
                    self.header.format
                )));
            }
            if self.header_variables.len() >= MAX_HEADER_VARIABLES {
                return Err(TemplateError::InvalidTemplate(
                    "Header text may contain at most one variable".to_string(),
                ));
            }
        }

        let (text, variables) = append_variable(
            self.section_text(section),
            self.variables(section),
            object,
            field,
            alternate_text,
        );
        self.set_section(section, text, variables);
        Ok(self)
    }

    /// Delete a variable; the rest are renumbered and the text rewritten.
    pub fn remove_variable(mut self, section: TemplateSection, index: u32) -> TemplateResult<Self> {
        let (text, variables) =
            remove_variable(self.section_text(section), self.variables(section), index)
                .ok_or(TemplateError::VariableNotFound { section, index })?;
        self.set_section(section, text, variables);
        Ok(self)
    }

    pub fn set_alternate_text(
        mut self,
        section: TemplateSection,
        index: u32,
        text: Option<String>,
    ) -> TemplateResult<Self> {
        let variables = match section {
            TemplateSection::Header => &mut self.header_variables,
            TemplateSection::Body => &mut self.body_variables,
        };
        let variable = variables
            .iter_mut()
            .find(|v| v.index == index)
            .ok_or(TemplateError::VariableNotFound { section, index })?;
        variable.alternate_text = text;
        Ok(self)
    }

    fn set_section(&mut self, section: TemplateSection, text: String, variables: Vec<Variable>) {
        match section {
            TemplateSection::Header => {
                self.header.text = Some(text);
                self.header_variables = variables;
            }
            TemplateSection::Body => {
                self.body = text;
                self.body_variables = variables;
            }
        }
    }
}
