use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, TemplateChunk, Token};
use std::fmt;
use std::rc::Rc;

/// Deepest nesting of statements and expressions the parser accepts
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parser error type
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the script subset
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parser over a fragment whose first character sits at `origin`
    fn with_origin(source: &str, origin: SourceLocation) -> Result<Self, ParseError> {
        let mut lexer = Lexer::with_origin(source, origin);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.nodes.push(self.parse_statement()?);
        }

        Ok(program)
    }

    /// Parse function declaration: [async] function name(params) { body }
    fn parse_function_declaration(&mut self, is_async: bool) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let name = self.expect_identifier()?;

        self.expect_token(&Token::LParen(loc), "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_token(&Token::RParen(loc), "Expected ')' after parameters")?;
        self.expect_token(&Token::LBrace(loc), "Expected '{' before function body")?;

        let body = self.parse_block_statements()?;

        self.expect_token(&Token::RBrace(loc), "Expected '}' after function body")?;

        Ok(AstNode::FunctionDecl(Rc::new(FunctionDef {
            name,
            params,
            body,
            is_async,
            location: loc,
        })))
    }

    /// Parse parameter list: (name, name, ...)
    fn parse_parameter_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        loop {
            params.push(self.expect_identifier()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse block statements (inside braces, excluding the braces themselves)
    fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Async(loc)) {
            self.expect_token(&Token::Function(loc), "Expected 'function' after 'async'")?;
            return self.parse_function_declaration(true);
        }

        if self.match_token(&Token::Function(loc)) {
            return self.parse_function_declaration(false);
        }

        if let Some(kind) = self.match_decl_kind() {
            let decl = self.parse_declarators(kind)?;
            self.consume_semicolon("Expected ';' after variable declaration")?;
            return Ok(decl);
        }

        if self.match_token(&Token::LBrace(loc)) {
            let body = self.parse_block_statements()?;
            self.expect_token(&Token::RBrace(loc), "Expected '}' after block")?;
            return Ok(AstNode::Block {
                body,
                location: loc,
            });
        }

        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Empty { location: loc });
        }

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.consume_semicolon("Expected ';' after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.consume_semicolon("Expected ';' after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        if self.match_token(&Token::Throw(loc)) {
            let expr = Box::new(self.parse_expression()?);
            self.consume_semicolon("Expected ';' after throw expression")?;
            return Ok(AstNode::Throw {
                expr,
                location: loc,
            });
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.consume_semicolon("Expected ';' after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse a declarator list after `let`/`const`/`var`: a = 1, b, c = 2
    fn parse_declarators(&mut self, kind: DeclKind) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();
        let mut declarators = Vec::new();

        loop {
            let name_loc = self.current_location();
            let name = self.expect_identifier()?;

            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(Box::new(self.parse_assignment()?))
            } else if kind.is_const() {
                return Err(ParseError {
                    message: format!("Missing initializer in const declaration '{}'", name),
                    location: name_loc,
                });
            } else {
                None
            };

            declarators.push(Declarator {
                name,
                init,
                location: name_loc,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(AstNode::VarDecl {
            kind,
            declarators,
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.at_statement_end() {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.consume_semicolon("Expected ';' after return")?;

        Ok(AstNode::Return { expr, location: loc })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let body = self.parse_statement_or_block()?;

        self.expect_token(&Token::While(loc), "Expected 'while' after do body")?;
        self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_token(&Token::RParen(loc), "Expected ')' after do-while condition")?;
        self.match_token(&Token::Semicolon(loc));

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_token(&Token::LParen(loc), "Expected '(' after 'for'")?;

        // Init (optional)
        let init = if self.check(&Token::Semicolon(loc)) {
            None
        } else if let Some(kind) = self.match_decl_kind() {
            Some(Box::new(self.parse_declarators(kind)?))
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&Token::Semicolon(loc), "Expected ';' after for init")?;

        // Condition (optional)
        let condition = if self.check(&Token::Semicolon(loc)) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_token(&Token::Semicolon(loc), "Expected ';' after for condition")?;

        // Increment (optional)
        let increment = if self.check(&Token::RParen(loc)) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_token(&Token::RParen(loc), "Expected ')' after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse statement or block (for if/while/for bodies)
    fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let statements = self.parse_block_statements()?;
            self.expect_token(
                &Token::RBrace(self.current_location()),
                "Expected '}' after block",
            )?;
            Ok(statements)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse expression (top-level entry point)
    fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_ternary()?;

        let loc = self.current_location();
        if self.match_token(&Token::Eq(loc)) {
            Self::ensure_assignable(&expr, loc)?;
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                lhs: Box::new(expr),
                rhs,
                location: loc,
            });
        }

        let compound_op = if self.match_token(&Token::PlusEq(loc)) {
            Some(BinOp::Add)
        } else if self.match_token(&Token::MinusEq(loc)) {
            Some(BinOp::Sub)
        } else if self.match_token(&Token::StarEq(loc)) {
            Some(BinOp::Mul)
        } else if self.match_token(&Token::SlashEq(loc)) {
            Some(BinOp::Div)
        } else if self.match_token(&Token::PercentEq(loc)) {
            Some(BinOp::Mod)
        } else {
            None
        };

        if let Some(op) = compound_op {
            Self::ensure_assignable(&expr, loc)?;
            let rhs = Box::new(self.parse_assignment()?);
            return Ok(AstNode::CompoundAssignment {
                lhs: Box::new(expr),
                op,
                rhs,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_nullish()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let true_expr = Box::new(self.parse_assignment()?);
            self.expect_token(&Token::Colon(loc), "Expected ':' in ternary expression")?;
            let false_expr = Box::new(self.parse_assignment()?);

            return Ok(AstNode::TernaryOp {
                condition: Box::new(expr),
                true_expr,
                false_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse nullish coalescing (??)
    fn parse_nullish(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_or()?;

        while self.match_token(&Token::QuestionQuestion(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_or()?);
            left = AstNode::BinaryOp {
                op: BinOp::Nullish,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (== != === !==)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else if self.match_token(&Token::EqEqEq(loc)) {
                BinOp::StrictEq
            } else if self.match_token(&Token::NotEqEq(loc)) {
                BinOp::StrictNe
            } else {
                break;
            };

            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_exponent()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            let right = Box::new(self.parse_exponent()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse exponentiation (**), right-associative
    fn parse_exponent(&mut self) -> Result<AstNode, ParseError> {
        let base = self.parse_unary()?;

        let loc = self.current_location();
        if self.match_token(&Token::StarStar(loc)) {
            let exponent = Box::new(self.parse_exponent()?);
            return Ok(AstNode::BinaryOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: exponent,
                location: loc,
            });
        }

        Ok(base)
    }

    /// Parse unary (! - + typeof ++ -- await)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = if self.match_token(&Token::Bang(loc)) {
            Some(UnOp::Not)
        } else if self.match_token(&Token::Minus(loc)) {
            Some(UnOp::Neg)
        } else if self.match_token(&Token::Plus(loc)) {
            Some(UnOp::Plus)
        } else if self.match_token(&Token::Typeof(loc)) {
            Some(UnOp::TypeOf)
        } else if self.match_token(&Token::PlusPlus(loc)) {
            Some(UnOp::PreInc)
        } else if self.match_token(&Token::MinusMinus(loc)) {
            Some(UnOp::PreDec)
        } else {
            None
        };

        if let Some(op) = op {
            let operand = self.nested(Self::parse_unary)?;
            if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                Self::ensure_assignable(&operand, loc)?;
            }
            return Ok(AstNode::UnaryOp {
                op,
                operand: Box::new(operand),
                location: loc,
            });
        }

        if self.match_token(&Token::Await(loc)) {
            let expr = Box::new(self.nested(Self::parse_unary)?);
            return Ok(AstNode::Await {
                expr,
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix (++ -- [] . ())
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::PlusPlus(loc)) {
                Self::ensure_assignable(&expr, loc)?;
                expr = AstNode::UnaryOp {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                Self::ensure_assignable(&expr, loc)?;
                expr = AstNode::UnaryOp {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(&Token::RBracket(loc), "Expected ']' after index")?;
                expr = AstNode::Index {
                    object: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_property_name()?;
                expr = AstNode::Member {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after function arguments")?;
                expr = AstNode::Call {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_assignment()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
            // Trailing comma before ')'
            if self.check(&Token::RParen(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, variables, arrays, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::Number(n, loc) => {
                self.advance();
                return Ok(AstNode::NumberLiteral(n, loc));
            }
            Token::Str(s, loc) => {
                self.advance();
                return Ok(AstNode::StringLiteral(s, loc));
            }
            Token::Template(chunks, loc) => {
                self.advance();
                return self.parse_template(chunks, loc);
            }
            Token::Ident(name, loc) => {
                self.advance();
                return Ok(AstNode::Variable(name, loc));
            }
            _ => {}
        }

        if self.match_token(&Token::True(loc)) {
            return Ok(AstNode::BoolLiteral(true, loc));
        }

        if self.match_token(&Token::False(loc)) {
            return Ok(AstNode::BoolLiteral(false, loc));
        }

        if self.match_token(&Token::Null(loc)) {
            return Ok(AstNode::Null { location: loc });
        }

        if self.match_token(&Token::Undefined(loc)) {
            return Ok(AstNode::Undefined { location: loc });
        }

        if self.match_token(&Token::LBracket(loc)) {
            return self.parse_array_literal(loc);
        }

        if self.match_token(&Token::New(loc)) {
            let constructor = self.expect_identifier()?;
            let args = if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_argument_list()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after constructor arguments")?;
                args
            } else {
                Vec::new()
            };
            return Ok(AstNode::New {
                constructor,
                args,
                location: loc,
            });
        }

        if self.match_token(&Token::LParen(loc)) {
            let expr = self.parse_expression()?;
            self.expect_token(&Token::RParen(loc), "Expected ')' after expression")?;
            return Ok(expr);
        }

        Err(ParseError {
            message: format!("Unexpected token: {}", self.peek()),
            location: loc,
        })
    }

    /// Parse array literal elements after '[' (trailing comma allowed)
    fn parse_array_literal(&mut self, loc: SourceLocation) -> Result<AstNode, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&Token::RBracket(loc)) {
            elements.push(self.parse_assignment()?);
            if !self.match_token(&Token::Comma(loc)) {
                break;
            }
        }

        self.expect_token(&Token::RBracket(loc), "Expected ']' after array elements")?;

        Ok(AstNode::ArrayLiteral {
            elements,
            location: loc,
        })
    }

    /// Turn lexer template chunks into AST parts, parsing each `${...}` source
    fn parse_template(
        &mut self,
        chunks: Vec<TemplateChunk>,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let mut parts = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            match chunk {
                TemplateChunk::Text(text) => parts.push(TemplatePart::Text(text)),
                TemplateChunk::Expr(source, expr_loc) => {
                    let mut sub = Parser::with_origin(&source, expr_loc)?;
                    sub.depth = self.depth;
                    let expr = sub.parse_expression()?;
                    if !sub.is_at_end() {
                        return Err(ParseError {
                            message: format!("Unexpected {} in template expression", sub.peek()),
                            location: sub.current_location(),
                        });
                    }
                    parts.push(TemplatePart::Expr(Box::new(expr)));
                }
            }
        }

        Ok(AstNode::TemplateLiteral(parts, loc))
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError {
                message: "Expression nested too deeply".to_string(),
                location: self.current_location(),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn ensure_assignable(expr: &AstNode, loc: SourceLocation) -> Result<(), ParseError> {
        match expr {
            AstNode::Variable(..) | AstNode::Index { .. } | AstNode::Member { .. } => Ok(()),
            _ => Err(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location: loc,
            }),
        }
    }

    fn match_decl_kind(&mut self) -> Option<DeclKind> {
        let kind = match self.peek() {
            Token::Let(_) => DeclKind::Let,
            Token::Const(_) => DeclKind::Const,
            Token::Var(_) => DeclKind::Var,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    /// True when the next token cannot continue the current statement
    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            Token::Semicolon(_) | Token::RBrace(_) | Token::Eof(_)
        ) || self.on_new_line()
    }

    fn on_new_line(&self) -> bool {
        self.position > 0 && self.current_location().line > self.previous_location().line
    }

    /// Accept an explicit ';' or an inserted one before '}', end of input or a line break
    fn consume_semicolon(&mut self, message: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(());
        }
        if matches!(self.peek(), Token::RBrace(_) | Token::Eof(_)) || self.on_new_line() {
            return Ok(());
        }
        Err(ParseError {
            message: format!("{}, found {}", message, self.peek()),
            location: self.current_location(),
        })
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    /// Property names after '.' may be reserved words (e.g. `x.length`, `e.new`)
    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek() {
            Token::Ident(name, _) => name.clone(),
            Token::Number(..) | Token::Str(..) | Token::Template(..) | Token::Eof(_) => {
                return Err(ParseError {
                    message: format!("Expected property name, found {}", self.peek()),
                    location: self.current_location(),
                });
            }
            other => {
                let text = other.to_string();
                let trimmed = text.trim_matches('\'');
                if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ParseError {
                        message: format!("Expected property name, found {}", other),
                        location: self.current_location(),
                    });
                }
                trimmed.to_string()
            }
        };
        self.advance();
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    #[test]
    fn test_parse_async_function() {
        let program = parse("async function sort(a, b) { return a + b; }");

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::FunctionDecl(def) => {
                assert_eq!(def.name, "sort");
                assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
                assert!(def.is_async);
                assert_eq!(def.body.len(), 1);
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("let x = 1 + 2 * 3;");

        match &program.nodes[0] {
            AstNode::VarDecl { declarators, .. } => match declarators[0].init.as_deref() {
                Some(AstNode::BinaryOp {
                    op: BinOp::Add,
                    right,
                    ..
                }) => {
                    assert!(matches!(**right, AstNode::BinaryOp { op: BinOp::Mul, .. }));
                }
                other => panic!("Unexpected initializer: {:?}", other),
            },
            _ => panic!("Expected declaration"),
        }
    }

    #[test]
    fn test_parse_counted_for_loop() {
        let program = parse("for (let i = 0; i < list.length; i++) { list[i] = 0; }");

        match &program.nodes[0] {
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                assert!(matches!(init.as_deref(), Some(AstNode::VarDecl { kind: DeclKind::Let, .. })));
                assert!(condition.is_some());
                assert!(matches!(
                    increment.as_deref(),
                    Some(AstNode::UnaryOp { op: UnOp::PostInc, .. })
                ));
                assert_eq!(body.len(), 1);
            }
            _ => panic!("Expected for loop"),
        }
    }

    #[test]
    fn test_automatic_semicolons() {
        let program = parse("let a = 1\nlet b = 2\nawait log(a + b)");
        assert_eq!(program.nodes.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line_is_error() {
        let mut parser = Parser::new("let a = 1 let b = 2").unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_parse_template_expression() {
        let program = parse("log(`value: ${list[0] + 1}`);");
        match &program.nodes[0] {
            AstNode::ExpressionStatement { expr, .. } => match &**expr {
                AstNode::Call { args, .. } => {
                    assert!(matches!(&args[0], AstNode::TemplateLiteral(parts, _) if parts.len() == 2));
                }
                other => panic!("Expected call, got {:?}", other),
            },
            _ => panic!("Expected expression statement"),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        let mut parser = Parser::new("1 = 2;").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("Invalid left-hand side"));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let source = format!("let x = {}1{};", "(".repeat(500), ")".repeat(500));
        let mut parser = Parser::new(&source).unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.message, "Expression nested too deeply");

        let source = format!("log({}1);", "- ".repeat(500));
        let err = Parser::new(&source).unwrap().parse_program().unwrap_err();
        assert_eq!(err.message, "Expression nested too deeply");
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("let x = {}1{};", "(".repeat(20), ")".repeat(20));
        let program = parse(&source);
        assert_eq!(program.nodes.len(), 1);
    }

    #[test]
    fn test_const_requires_initializer() {
        let mut parser = Parser::new("const x;").unwrap();
        assert!(parser.parse_program().is_err());
    }
}
