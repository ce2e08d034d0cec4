use super::*;

const DECLARATION_MODIFIERS: &[TokenKind] = &[TokenKind::KwPub, TokenKind::KwExt];
const PARAMETER_MODIFIERS: &[TokenKind] = &[TokenKind::KwVar, TokenKind::KwRef, TokenKind::KwMut];

impl Parser {
    pub(super) fn parse_program(&mut self) -> PassResult<Program> {
        let module = self.parse_module_header();
        let mut statements = Vec::new();
        let mut seen_declaration = false;

        while !self.is_eof() {
            let started_at = self.cursor;

            match self.parse_top_level() {
                Ok(stmt) => {
                    if stmt.is_import() {
                        if seen_declaration {
                            self.report(
                                stmt.span(),
                                "Top-level import statements must appear before any other statements",
                            );
                        }
                    } else {
                        seen_declaration = true;
                    }
                    statements.push(stmt);
                }
                Err(failure) => {
                    self.record(failure);
                    self.synchronize_top_level(started_at);
                }
            }
        }

        Ok(Program {
            module,
            statements,
            span: Span::new(0, self.source.len()),
        })
    }

    fn parse_module_header(&mut self) -> ModuleName {
        if !self.check(TokenKind::KwMod) {
            let at = self.current_span().start;
            self.report(
                Span::new(at, at),
                "All Cinder files must begin with a module name: 'mod <name>'",
            );
            return ModuleName::error(Span::new(at, at));
        }

        let started_at = self.cursor;
        let keyword = self.bump();

        match self.parse_module_name(keyword.span) {
            Ok(name) => name,
            Err(failure) => {
                self.record(failure);
                self.synchronize_top_level(started_at);
                ModuleName::error(keyword.span)
            }
        }
    }

    fn parse_module_name(&mut self, keyword: Span) -> PassResult<ModuleName> {
        let mut segments = vec![self.expect_token(TokenKind::Identifier)?];

        while self.eat(TokenKind::Dot).is_some() {
            segments.push(self.expect_token(TokenKind::Identifier)?);
        }

        self.finish_statement()?;

        Ok(ModuleName {
            span: keyword.join(self.previous_span()),
            segments,
        })
    }

    fn parse_top_level(&mut self) -> PassResult<Stmt> {
        match self.current_kind() {
            TokenKind::KwUse => self.parse_import(),
            TokenKind::Identifier => self.parse_declaration(),
            _ => Err(self.unexpected(&[TokenKind::KwUse.as_str(), "declaration"])),
        }
    }

    fn parse_import(&mut self) -> PassResult<Stmt> {
        let keyword = self.expect_token(TokenKind::KwUse)?;
        let mut path = Vec::new();
        let mut group = None;

        loop {
            path.push(self.require(&[TokenKind::Identifier, TokenKind::Star])?);

            if self.eat(TokenKind::Dot).is_none() {
                break;
            }
            if self.check(TokenKind::LBrace) {
                group = Some(self.parse_import_items()?);
                break;
            }
        }

        let alias = match self.eat(TokenKind::KwAs) {
            Some(_) => Some(self.expect_token(TokenKind::Identifier)?),
            None => None,
        };

        let span = keyword.span.join(self.previous_span());
        self.finish_statement()?;

        let invalid = || self.error(span, "Invalid import statement");
        let is_module_path = |segments: &[Token]| {
            segments
                .iter()
                .all(|segment| segment.kind == TokenKind::Identifier)
        };

        match group {
            Some(items) => {
                if items.is_empty() || !is_module_path(&path) {
                    return Err(invalid());
                }

                Ok(Stmt::AggregateImport(AggregateImportStmt {
                    scope: path,
                    items,
                    alias,
                    span,
                }))
            }
            None => {
                let Some(item) = path.pop() else {
                    return Err(invalid());
                };
                let wildcard_alias = item.kind == TokenKind::Star && alias.is_some();

                if path.is_empty() || !is_module_path(&path) || wildcard_alias {
                    return Err(invalid());
                }

                Ok(Stmt::Import(ImportStmt {
                    scope: path,
                    item,
                    alias,
                    span,
                }))
            }
        }
    }

    fn parse_import_items(&mut self) -> PassResult<Vec<ImportItem>> {
        self.expect_token(TokenKind::LBrace)?;
        let mut items = Vec::new();

        while !self.check(TokenKind::RBrace) {
            let name = self.expect_token(TokenKind::Identifier)?;
            let alias = match self.eat(TokenKind::KwAs) {
                Some(_) => Some(self.expect_token(TokenKind::Identifier)?),
                None => None,
            };
            items.push(ImportItem { name, alias });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect_token(TokenKind::RBrace)?;
        Ok(items)
    }

    fn parse_declaration(&mut self) -> PassResult<Stmt> {
        let name = self.expect_token(TokenKind::Identifier)?;
        self.expect_token(TokenKind::Colon)?;
        let modifiers = self.parse_modifiers(DECLARATION_MODIFIERS);

        match self.current_kind() {
            TokenKind::KwEntry => self.parse_entry(name, modifiers),
            kind @ (TokenKind::KwFun | TokenKind::KwType | TokenKind::KwEnum) => Err(self.error(
                self.current_span(),
                format!("'{kind}' declarations are not supported yet"),
            )),
            _ => Err(self.error(
                name.span.join(self.current_span()),
                "Value declarations are not supported yet",
            )),
        }
    }

    /// Collect modifiers from `allowed`, reporting and dropping duplicates.
    fn parse_modifiers(&mut self, allowed: &[TokenKind]) -> Vec<Token> {
        let mut modifiers: Vec<Token> = Vec::new();

        while allowed.contains(&self.current_kind()) {
            let modifier = self.bump();

            if modifiers.iter().any(|seen| seen.kind == modifier.kind) {
                self.report(
                    modifier.span,
                    format!("Duplicate modifier '{}'", modifier.kind),
                );
                continue;
            }
            modifiers.push(modifier);
        }

        modifiers
    }

    fn parse_entry(&mut self, name: Token, modifiers: Vec<Token>) -> PassResult<Stmt> {
        self.expect_token(TokenKind::KwEntry)?;
        let parameters = self.parse_parameter_list()?;
        let mut effects = Vec::new();
        let mut return_type = None;

        if self.eat(TokenKind::Colon).is_some() {
            if self.eat(TokenKind::Bang).is_some() {
                effects.push(self.expect_token(TokenKind::Identifier)?);
                while self.eat(TokenKind::Comma).is_some() {
                    effects.push(self.expect_token(TokenKind::Identifier)?);
                }
            }

            if !self.check(TokenKind::LBrace) {
                return_type = Some(self.parse_type()?);
            }
        }

        let body = self.parse_block()?;
        let span = name.span.join(body.span);

        tracing::debug!(entry = name.text(), "parsed entry declaration");

        Ok(Stmt::Entry(EntryStmt {
            name,
            modifiers,
            parameters,
            effects,
            return_type,
            body,
            span,
        }))
    }

    /// `( parameter, ... )`, validated as a whole once parsed.
    pub(super) fn parse_parameter_list(&mut self) -> PassResult<Vec<Parameter>> {
        self.expect_token(TokenKind::LParen)?;
        let mut parameters = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                parameters.push(self.parse_parameter()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect_token(TokenKind::RParen)?;
        self.validate_parameters(&parameters);
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> PassResult<Parameter> {
        let start = self.current_span();
        let modifiers = self.parse_modifiers(PARAMETER_MODIFIERS);

        if let Some(token) = self.eat(TokenKind::KwSelf) {
            let modifiers = self.retain_modifiers(
                modifiers,
                TokenKind::KwVar,
                "'var' is not valid on 'self'; did you mean 'mut'?",
            );

            return Ok(Parameter::SelfParam(SelfParameter {
                span: start.join(token.span),
                token,
                modifiers,
            }));
        }

        let modifiers = self.retain_modifiers(
            modifiers,
            TokenKind::KwMut,
            "'mut' is only valid on 'self'; did you mean 'var'?",
        );
        let name = self.expect_token(TokenKind::Identifier)?;
        self.expect_token(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let variadic = self.eat(TokenKind::Ellipsis).is_some();
        let default = match self.eat(TokenKind::Assign) {
            Some(_) => Some(self.parse_expression()?),
            None => None,
        };

        Ok(Parameter::Variable(VariableParameter {
            span: start.join(self.previous_span()),
            name,
            modifiers,
            ty,
            variadic,
            default,
        }))
    }

    /// Report and drop every modifier of kind `rejected`.
    fn retain_modifiers(
        &mut self,
        modifiers: Vec<Token>,
        rejected: TokenKind,
        message: &str,
    ) -> Vec<Token> {
        let mut kept = Vec::with_capacity(modifiers.len());

        for modifier in modifiers {
            if modifier.kind == rejected {
                self.report(modifier.span, message);
            } else {
                kept.push(modifier);
            }
        }

        kept
    }

    fn validate_parameters(&mut self, parameters: &[Parameter]) {
        let last = parameters.len().saturating_sub(1);
        let mut defaults_started = false;

        for (index, parameter) in parameters.iter().enumerate() {
            match parameter {
                Parameter::SelfParam(param) => {
                    if index != 0 {
                        self.report(param.span, "'self' must be the first parameter");
                    }
                }
                Parameter::Variable(param) => {
                    if param.variadic && index != last {
                        self.report(param.span, "A variadic parameter must be the last parameter");
                    }

                    if param.default.is_some() {
                        defaults_started = true;
                    } else if defaults_started && !param.variadic {
                        self.report(
                            param.span,
                            format!(
                                "Parameter '{}' must have a default value because a previous parameter does",
                                param.name.text()
                            ),
                        );
                    }
                }
            }
        }
    }
}
